//! UI-thread task queue
//!
//! Everything in the session runs on one thread. Work that must happen
//! "later" is queued here and run by [`MessageLoop::dispatch`], which the
//! application calls once per frame. Work that would block (disk, plugin
//! probing) goes through [`MessageLoop::spawn_blocking`]: it runs on a worker
//! thread and its completion callback is delivered back on the UI thread.

use crossbeam_channel::{Receiver, TryRecvError};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

type Task = Box<dyn FnOnce()>;

enum JobStatus {
    Pending,
    Finished(Task),
}

struct Timer {
    deadline: Instant,
    task: Task,
}

#[derive(Default)]
struct LoopState {
    posted: VecDeque<Task>,
    timers: Vec<Timer>,
    jobs: Vec<Box<dyn FnMut() -> JobStatus>>,
}

/// Cheaply clonable handle to the UI thread's task queue
#[derive(Clone, Default)]
pub struct MessageLoop {
    state: Rc<RefCell<LoopState>>,
}

impl MessageLoop {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` on the next dispatch
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.state.borrow_mut().posted.push_back(Box::new(task));
    }

    /// Run `task` on the first dispatch at or after `delay` from now
    pub fn call_after_delay<F>(&self, delay: Duration, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.call_at(Instant::now() + delay, task);
    }

    /// Run `task` on the first dispatch at or after `deadline`
    pub fn call_at<F>(&self, deadline: Instant, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.state.borrow_mut().timers.push(Timer {
            deadline,
            task: Box::new(task),
        });
    }

    /// Run `work` on a worker thread and deliver its result to `completion`
    /// on the UI thread, during a later dispatch.
    ///
    /// If the worker panics the completion is dropped without being called.
    pub fn spawn_blocking<W, R, C>(&self, work: W, completion: C)
    where
        W: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
        C: FnOnce(R) + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded::<R>(1);

        std::thread::spawn(move || {
            let result = work();
            let _ = sender.send(result);
        });

        self.state
            .borrow_mut()
            .jobs
            .push(Box::new(Self::completion_poller(receiver, completion)));
    }

    fn completion_poller<R, C>(receiver: Receiver<R>, completion: C) -> impl FnMut() -> JobStatus
    where
        R: 'static,
        C: FnOnce(R) + 'static,
    {
        let mut completion = Some(completion);
        move || match receiver.try_recv() {
            Ok(result) => match completion.take() {
                Some(completion) => JobStatus::Finished(Box::new(move || completion(result))),
                None => JobStatus::Finished(Box::new(|| {})),
            },
            Err(TryRecvError::Empty) => JobStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Background job ended without producing a result");
                JobStatus::Finished(Box::new(|| {}))
            }
        }
    }

    /// Run everything that is due now. Returns the number of tasks run.
    pub fn dispatch(&self) -> usize {
        self.dispatch_at(Instant::now())
    }

    /// Run everything that is due at `now`.
    ///
    /// Tasks queued by the tasks being run are left for the next dispatch.
    pub fn dispatch_at(&self, now: Instant) -> usize {
        let mut ready: Vec<Task> = Vec::new();

        {
            let mut state = self.state.borrow_mut();

            let mut due = Vec::new();
            let mut waiting = Vec::new();
            for timer in state.timers.drain(..) {
                if timer.deadline <= now {
                    due.push(timer);
                } else {
                    waiting.push(timer);
                }
            }
            state.timers = waiting;
            due.sort_by_key(|timer| timer.deadline);
            ready.extend(due.into_iter().map(|timer| timer.task));

            ready.extend(state.posted.drain(..));

            let mut still_running = Vec::new();
            for mut job in state.jobs.drain(..) {
                match job() {
                    JobStatus::Pending => still_running.push(job),
                    JobStatus::Finished(task) => ready.push(task),
                }
            }
            state.jobs = still_running;
        }

        let count = ready.len();
        for task in ready {
            task();
        }
        count
    }

    /// Whether anything is queued, scheduled or running in the background
    pub fn has_pending_work(&self) -> bool {
        let state = self.state.borrow();
        !state.posted.is_empty() || !state.timers.is_empty() || !state.jobs.is_empty()
    }

    /// Number of background jobs whose completion has not been delivered yet
    pub fn pending_jobs(&self) -> usize {
        self.state.borrow().jobs.len()
    }

    /// Earliest timer deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.borrow().timers.iter().map(|t| t.deadline).min()
    }
}

/// A dirty flag for use with [`AsyncUpdater`]
#[derive(Debug, Default)]
pub struct UpdateFlag(Cell<bool>);

impl UpdateFlag {
    /// Create a clean flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the flag is set
    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    /// Clear the flag, returning whether it was set
    pub fn compare_and_reset(&self) -> bool {
        self.0.replace(false)
    }

    fn set(&self) {
        self.0.set(true);
    }
}

/// Coalesces any number of update requests into one call of a handler on a
/// later dispatch.
///
/// The updater is either idle or has exactly one task queued. Triggering while
/// a task is queued does nothing.
pub struct AsyncUpdater {
    message_loop: MessageLoop,
    pending: Rc<Cell<bool>>,
    handler: Rc<dyn Fn()>,
}

impl AsyncUpdater {
    /// Create an updater that calls `handler` when a queued update runs
    pub fn new<F>(message_loop: MessageLoop, handler: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            message_loop,
            pending: Rc::new(Cell::new(false)),
            handler: Rc::new(handler),
        }
    }

    /// Queue an update unless one is already queued
    pub fn trigger_async_update(&self) {
        if self.pending.replace(true) {
            return;
        }

        let pending = Rc::downgrade(&self.pending);
        let handler = Rc::downgrade(&self.handler);
        self.message_loop.post(move || {
            let (Some(pending), Some(handler)) = (pending.upgrade(), handler.upgrade()) else {
                return;
            };
            if pending.replace(false) {
                handler();
            }
        });
    }

    /// Set `flag` and queue an update
    pub fn mark_and_update(&self, flag: &UpdateFlag) {
        flag.set();
        self.trigger_async_update();
    }

    /// Drop a queued update without running it
    pub fn cancel_pending_update(&self) {
        self.pending.set(false);
    }

    /// Run the handler now if an update is queued
    pub fn handle_update_now_if_needed(&self) {
        if self.pending.replace(false) {
            (self.handler)();
        }
    }

    /// Whether an update is queued
    pub fn is_update_pending(&self) -> bool {
        self.pending.get()
    }
}
