//! Isolated execution of voxel-processing tasks.
//!
//! Each [`TaskHandle`] owns one worker thread reachable only through a
//! bounded channel: the caller hands over one [`TaskRequest`] at spawn time
//! and receives exactly one reply, either the result payload or a string
//! describing the failure. Panics inside a task are caught at the thread
//! boundary and reported the same way, so a misbehaving algorithm can never
//! take the host process down or leak into other in-flight tasks.

use crate::enums::Connectivity;
use crate::tasks::labeling::{self, LabelingResults3D};
use crate::tasks::{interslice, morphology};

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;

/// One voxel-processing request. Buffers are moved into the worker; the
/// caller keeps no shared mutable state with a running task.
#[derive(Clone, Debug)]
pub enum TaskRequest {
    ConnectedComponents {
        input: Vec<u8>,
        width: usize,
        height: usize,
        n_slices: usize,
        connectivity: Connectivity,
        max_components: usize,
    },
    Morphology {
        input: Vec<u8>,
        width: usize,
        height: usize,
        n_slices: usize,
        structure: Vec<[i32; 3]>,
        erode: bool,
    },
    InterpolateSlices {
        input: Vec<u8>,
        width: usize,
        height: usize,
        n_slices: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskReply {
    Labeling(LabelingResults3D),
    Mask(Vec<u8>),
}

/// Handle to a single in-flight voxel task.
///
/// A handle serves exactly one request: `spawn` consumes the request and
/// `join` consumes the handle, so a second request on the same instance is
/// unrepresentable. Callers wanting overlap spawn additional handles; the
/// scheduler orders replies within a handle but not across handles.
pub struct TaskHandle {
    reply_rx: Receiver<Result<TaskReply, String>>,
    thread: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Start the task on its own worker thread.
    pub fn spawn(request: TaskRequest) -> Self {
        Self::spawn_with(move || run_task(request))
    }

    fn spawn_with<F>(task: F) -> Self
    where
        F: FnOnce() -> Result<TaskReply, String> + Send + 'static,
    {
        let (reply_tx, reply_rx) = bounded(1);
        let thread = thread::spawn(move || {
            let reply = catch_unwind(AssertUnwindSafe(task))
                .unwrap_or_else(|panic| Err(describe_panic(panic.as_ref())));
            if let Err(message) = &reply {
                warn!(%message, "voxel task failed");
            }
            // Send fails only when the task was cancelled; the reply is
            // discarded in that case, never delivered late.
            let _ = reply_tx.send(reply);
        });
        Self {
            reply_rx,
            thread: Some(thread),
        }
    }

    /// Block until the task's single reply arrives.
    ///
    /// A worker that died without replying (a panic escaping even the
    /// reply path) is reported as a string error, never as a caller panic.
    pub fn join(mut self) -> Result<TaskReply, String> {
        let reply = self
            .reply_rx
            .recv()
            .unwrap_or_else(|_| Err("worker terminated without a reply".to_string()));
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        reply
    }

    /// Like [`join`](Self::join), but gives the handle back on timeout so
    /// the caller can keep waiting or [`cancel`](Self::cancel).
    pub fn join_timeout(mut self, timeout: Duration) -> Result<Result<TaskReply, String>, Self> {
        match self.reply_rx.recv_timeout(timeout) {
            Ok(reply) => {
                if let Some(thread) = self.thread.take() {
                    let _ = thread.join();
                }
                Ok(reply)
            }
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => {
                Ok(Err("worker terminated without a reply".to_string()))
            }
        }
    }

    /// Whether the task has produced its reply (or died trying).
    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .is_none_or(|thread| thread.is_finished())
    }

    /// Abandon the task. The worker is detached and its reply, whatever it
    /// turns out to be, is never observable; the caller's label volume
    /// stays as it was.
    pub fn cancel(mut self) {
        drop(self.thread.take());
    }
}

fn run_task(request: TaskRequest) -> Result<TaskReply, String> {
    match request {
        TaskRequest::ConnectedComponents {
            input,
            width,
            height,
            n_slices,
            connectivity,
            max_components,
        } => labeling::label_components_3d(
            &input,
            width,
            height,
            n_slices,
            connectivity,
            max_components,
        )
        .map(TaskReply::Labeling)
        .map_err(|e| e.to_string()),
        TaskRequest::Morphology {
            input,
            width,
            height,
            n_slices,
            structure,
            erode,
        } => morphology::apply(&input, width, height, n_slices, &structure, erode)
            .map(TaskReply::Mask)
            .map_err(|e| e.to_string()),
        TaskRequest::InterpolateSlices {
            input,
            width,
            height,
            n_slices,
        } => interslice::interpolate_slices(&input, width, height, n_slices)
            .map(TaskReply::Mask)
            .map_err(|e| e.to_string()),
    }
}

fn describe_panic(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("voxel task panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("voxel task panicked: {message}")
    } else {
        "voxel task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::morphology::cross_structure;

    fn two_corner_mask(dim: usize) -> Vec<u8> {
        let mut mask = vec![0u8; dim * dim * dim];
        mask[0] = 1;
        *mask.last_mut().unwrap() = 1;
        mask
    }

    #[test]
    fn labeling_request_round_trips() {
        let handle = TaskHandle::spawn(TaskRequest::ConnectedComponents {
            input: two_corner_mask(5),
            width: 5,
            height: 5,
            n_slices: 5,
            connectivity: Connectivity::TwentySix,
            max_components: 10,
        });
        match handle.join() {
            Ok(TaskReply::Labeling(results)) => {
                assert_eq!(results.label_count, 2);
                assert!(results.stats.iter().all(|s| s.volume == 1));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn morphology_request_round_trips() {
        let mut input = vec![0u8; 27];
        input[13] = 1;
        let handle = TaskHandle::spawn(TaskRequest::Morphology {
            input,
            width: 3,
            height: 3,
            n_slices: 3,
            structure: cross_structure(),
            erode: false,
        });
        match handle.join() {
            Ok(TaskReply::Mask(mask)) => {
                assert_eq!(mask.iter().filter(|&&v| v != 0).count(), 7);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn invalid_dimensions_surface_as_error_reply() {
        let handle = TaskHandle::spawn(TaskRequest::InterpolateSlices {
            input: vec![0u8; 5],
            width: 2,
            height: 2,
            n_slices: 2,
        });
        let message = handle.join().unwrap_err();
        assert!(message.contains("does not match"), "got: {message}");
    }

    #[test]
    fn component_bound_error_crosses_the_boundary() {
        let handle = TaskHandle::spawn(TaskRequest::ConnectedComponents {
            input: two_corner_mask(3),
            width: 3,
            height: 3,
            n_slices: 3,
            connectivity: Connectivity::Six,
            max_components: 1,
        });
        let message = handle.join().unwrap_err();
        assert!(message.contains("maximum of 1"), "got: {message}");
    }

    #[test]
    fn worker_panic_surfaces_as_error_reply() {
        // &str panic payload.
        let handle = TaskHandle::spawn_with(|| panic!("mask buffer corrupted"));
        let message = handle.join().unwrap_err();
        assert!(message.contains("panicked"), "got: {message}");
        assert!(message.contains("mask buffer corrupted"), "got: {message}");

        // Formatted (String) panic payload.
        let handle = TaskHandle::spawn_with(|| panic!("slice {} out of range", 9));
        let message = handle.join().unwrap_err();
        assert!(message.contains("slice 9 out of range"), "got: {message}");
    }

    #[test]
    fn handles_complete_independently() {
        let spawn = |mask: Vec<u8>| {
            TaskHandle::spawn(TaskRequest::ConnectedComponents {
                input: mask,
                width: 5,
                height: 5,
                n_slices: 5,
                connectivity: Connectivity::Six,
                max_components: 100,
            })
        };
        let first = spawn(two_corner_mask(5));
        let second = spawn(vec![1u8; 125]);

        // Join in reverse spawn order; each handle pairs its own reply.
        match second.join() {
            Ok(TaskReply::Labeling(results)) => assert_eq!(results.label_count, 1),
            other => panic!("unexpected reply: {other:?}"),
        }
        match first.join() {
            Ok(TaskReply::Labeling(results)) => assert_eq!(results.label_count, 2),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn cancelled_task_emits_nothing() {
        let handle = TaskHandle::spawn(TaskRequest::ConnectedComponents {
            input: vec![1u8; 64 * 64 * 64],
            width: 64,
            height: 64,
            n_slices: 64,
            connectivity: Connectivity::TwentySix,
            max_components: 100,
        });
        handle.cancel();
        // Nothing to observe afterwards; the worker's send is discarded.
    }

    #[test]
    fn join_timeout_returns_the_handle_while_running() {
        let handle = TaskHandle::spawn(TaskRequest::ConnectedComponents {
            input: vec![1u8; 48 * 48 * 48],
            width: 48,
            height: 48,
            n_slices: 48,
            connectivity: Connectivity::TwentySix,
            max_components: 100,
        });
        match handle.join_timeout(Duration::ZERO) {
            Ok(reply) => {
                // Small volumes can finish before the first poll.
                assert!(reply.is_ok());
            }
            Err(handle) => {
                let reply = handle.join().expect("labeling reply");
                assert!(matches!(reply, TaskReply::Labeling(_)));
            }
        }
    }
}
