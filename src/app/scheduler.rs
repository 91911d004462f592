use super::Message;
use std::{collections::HashMap, sync::mpsc};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, Duration, Instant},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    CountdownTick,
    NotificationDismiss,
}

/// Owns the app's background timers. Each kind has at most one live task;
/// starting a kind again replaces the previous task.
pub struct Scheduler {
    sender: mpsc::Sender<Message>,
    handle: Handle,
    tasks: HashMap<TimerKind, JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(sender: mpsc::Sender<Message>, handle: Handle) -> Self {
        Self {
            sender,
            handle,
            tasks: HashMap::new(),
        }
    }

    /// Posts `make()` every `period`, first after one full period.
    pub fn start_repeating<F>(&mut self, kind: TimerKind, period: Duration, make: F)
    where
        F: Fn() -> Message + Send + 'static,
    {
        let sender = self.sender.clone();
        let task = self.handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if sender.send(make()).is_err() {
                    break;
                }
            }
        });
        self.replace(kind, task);
    }

    pub fn start_once(&mut self, kind: TimerKind, delay: Duration, message: Message) {
        let sender = self.sender.clone();
        let task = self.handle.spawn(async move {
            time::sleep(delay).await;
            let _ = sender.send(message);
        });
        self.replace(kind, task);
    }

    pub fn stop(&mut self, kind: TimerKind) -> bool {
        match self.tasks.remove(&kind) {
            Some(task) => {
                task.abort();
                debug!(?kind, "timer stopped");
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.tasks
            .get(&kind)
            .is_some_and(|task| !task.is_finished())
    }

    fn replace(&mut self, kind: TimerKind, task: JoinHandle<()>) {
        if let Some(previous) = self.tasks.insert(kind, task) {
            previous.abort();
        }
        debug!(?kind, "timer started");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mpsc::Receiver<Message>) -> Vec<Message> {
        rx.try_iter().collect()
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_timer_ticks_until_stopped() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = Scheduler::new(tx, Handle::current());
        scheduler.start_repeating(TimerKind::CountdownTick, Duration::from_secs(1), || {
            Message::CountdownTick
        });

        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(drain(&rx).len(), 3);
        assert!(scheduler.is_running(TimerKind::CountdownTick));

        assert!(scheduler.stop(TimerKind::CountdownTick));
        time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&rx).is_empty());
        assert!(!scheduler.stop(TimerKind::CountdownTick));
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_fires_after_delay() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = Scheduler::new(tx, Handle::current());
        scheduler.start_once(
            TimerKind::NotificationDismiss,
            Duration::from_secs(8),
            Message::NotificationExpired(1),
        );

        time::sleep(Duration::from_millis(7_900)).await;
        assert!(drain(&rx).is_empty());
        time::sleep(Duration::from_millis(200)).await;
        assert!(matches!(drain(&rx).as_slice(), [Message::NotificationExpired(1)]));
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_replaces_the_pending_task() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = Scheduler::new(tx, Handle::current());
        let delay = Duration::from_secs(8);
        scheduler.start_once(
            TimerKind::NotificationDismiss,
            delay,
            Message::NotificationExpired(1),
        );
        time::sleep(Duration::from_secs(5)).await;
        scheduler.start_once(
            TimerKind::NotificationDismiss,
            delay,
            Message::NotificationExpired(1),
        );

        time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&rx).is_empty());
        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(drain(&rx).len(), 1);
    }
}
