//! Observer: a subject broadcasting its latest message to subscribers.
//!
//! The subject owns its subscribers (`Rc<dyn Observer>`); an observer only
//! keeps a `Weak` back to its subject so it can detach itself later. Because
//! the subject holds strong handles, an observer cannot be destroyed while it
//! is still attached.
//!
//! `notify` walks a snapshot of the subscriber list taken when the pass
//! starts. Observers may detach themselves or others from inside `update`;
//! the change shows up on the next pass, never in the current one.

use crate::error::Result;
use crate::output::Sink;
use crate::sequence::ObserverSequence;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub const DEFAULT_MESSAGE: &str = "Empty";

pub trait Observer {
    fn update(&self, message: &str);
}

fn same_observer(entry: &Rc<dyn Observer>, observer: &dyn Observer) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(entry), observer)
}

pub struct Subject {
    observers: RefCell<Vec<Rc<dyn Observer>>>,
    message: RefCell<String>,
    sink: Rc<dyn Sink>,
}

impl Subject {
    pub fn new(sink: Rc<dyn Sink>) -> Rc<Self> {
        Rc::new(Subject {
            observers: RefCell::new(Vec::new()),
            message: RefCell::new(String::new()),
            sink,
        })
    }

    pub fn sink(&self) -> &Rc<dyn Sink> {
        &self.sink
    }

    /// Appends to the end. Attaching the same observer twice gives it two
    /// entries and two deliveries per pass.
    pub fn attach(&self, observer: Rc<dyn Observer>) {
        let mut observers = self.observers.borrow_mut();
        observers.push(observer);
        tracing::debug!(size = observers.len(), "observer attached");
    }

    /// Removes the first matching entry. Absent observers are ignored.
    pub fn detach(&self, observer: &dyn Observer) -> bool {
        let mut observers = self.observers.borrow_mut();
        match observers
            .iter()
            .position(|entry| same_observer(entry, observer))
        {
            Some(index) => {
                observers.remove(index);
                tracing::debug!(size = observers.len(), "observer detached");
                true
            }
            None => {
                tracing::debug!("detach ignored, observer not attached");
                false
            }
        }
    }

    pub fn is_attached(&self, observer: &dyn Observer) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|entry| same_observer(entry, observer))
    }

    pub fn size(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn message(&self) -> String {
        self.message.borrow().clone()
    }

    pub fn how_many_observers(&self) {
        self.sink
            .line(&format!("There are {} observers in the list.", self.size()));
    }

    pub fn notify(&self) {
        // Both borrows end before any callback runs, so callbacks are free to
        // attach, detach or read the message.
        let snapshot: Vec<Rc<dyn Observer>> = self.observers.borrow().clone();
        let message = self.message();

        self.how_many_observers();
        tracing::debug!(observers = snapshot.len(), %message, "notifying");
        for observer in snapshot {
            tracing::trace!(%message, "delivering");
            observer.update(&message);
        }
    }

    pub fn create_message(&self, message: impl Into<String>) {
        *self.message.borrow_mut() = message.into();
        self.notify();
    }

    pub fn create_default_message(&self) {
        self.create_message(DEFAULT_MESSAGE);
    }

    pub fn some_business_logic(&self) {
        self.create_message("change message");
        self.sink.line("I'm about to do something important.");
    }
}

/// Numbered observer that remembers the last message it was sent.
pub struct MessageObserver {
    number: u64,
    subject: Weak<Subject>,
    last_message: RefCell<String>,
    sink: Rc<dyn Sink>,
}

impl MessageObserver {
    /// Draws a number from `sequence` and attaches to `subject` right away.
    /// Nothing is attached when the sequence has run out.
    pub fn new(subject: &Rc<Subject>, sequence: &ObserverSequence) -> Result<Rc<Self>> {
        let observer = Rc::new(MessageObserver {
            number: sequence.next()?,
            subject: Rc::downgrade(subject),
            last_message: RefCell::new(String::new()),
            sink: Rc::clone(subject.sink()),
        });

        subject.attach(observer.clone());
        observer
            .sink
            .line(&format!("Hi, I'm the Observer \"{}\"", observer.number));
        Ok(observer)
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn last_message(&self) -> String {
        self.last_message.borrow().clone()
    }

    pub fn remove_me_from_the_list(&self) {
        if let Some(subject) = self.subject.upgrade() {
            subject.detach(self);
        }
        self.sink.line(&format!(
            "Observer \"{}\" removed from the list.",
            self.number
        ));
    }

    pub fn print_info(&self) {
        self.sink.line(&format!(
            "Observer \"{}\" a new message is available --> {}",
            self.number,
            self.last_message.borrow()
        ));
    }
}

impl Observer for MessageObserver {
    fn update(&self, message: &str) {
        *self.last_message.borrow_mut() = message.to_string();
        self.print_info();
    }
}

impl Drop for MessageObserver {
    fn drop(&mut self) {
        self.sink.line(&format!(
            "Goodbye, I was the Observer \"{}\"",
            self.number
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Transcript;
    use proptest::prelude::*;
    use std::cell::Cell;

    fn subject() -> (Rc<Subject>, Transcript) {
        let transcript = Transcript::new();
        let subject = Subject::new(Rc::new(transcript.clone()));
        (subject, transcript)
    }

    /// Records deliveries into a shared log, optionally detaching itself
    /// (or a victim) from inside `update`.
    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        subject: Weak<Subject>,
        detach_self: bool,
        victim: RefCell<Option<Rc<dyn Observer>>>,
    }

    impl Recorder {
        fn attach(
            subject: &Rc<Subject>,
            name: &'static str,
            log: &Rc<RefCell<Vec<String>>>,
            detach_self: bool,
        ) -> Rc<Self> {
            let recorder = Rc::new(Recorder {
                name,
                log: Rc::clone(log),
                subject: Rc::downgrade(subject),
                detach_self,
                victim: RefCell::new(None),
            });
            subject.attach(recorder.clone());
            recorder
        }
    }

    impl Observer for Recorder {
        fn update(&self, message: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.name, message));
            if let Some(subject) = self.subject.upgrade() {
                if self.detach_self {
                    subject.detach(self);
                }
                if let Some(victim) = self.victim.borrow_mut().take() {
                    subject.detach(victim.as_ref());
                }
            }
        }
    }

    #[test]
    fn test_three_observers_then_detach_third() {
        let (subject, transcript) = subject();
        let sequence = ObserverSequence::new();

        let first = MessageObserver::new(&subject, &sequence).unwrap();
        let second = MessageObserver::new(&subject, &sequence).unwrap();
        let third = MessageObserver::new(&subject, &sequence).unwrap();
        assert_eq!(subject.size(), 3);
        assert_eq!(
            [first.number(), second.number(), third.number()],
            [1, 2, 3]
        );
        transcript.take();

        subject.create_message("Hello");
        assert_eq!(
            transcript.take(),
            vec![
                "There are 3 observers in the list.",
                "Observer \"1\" a new message is available --> Hello",
                "Observer \"2\" a new message is available --> Hello",
                "Observer \"3\" a new message is available --> Hello",
            ]
        );

        third.remove_me_from_the_list();
        subject.create_message("Next");
        assert_eq!(subject.size(), 2);
        assert_eq!(first.last_message(), "Next");
        assert_eq!(second.last_message(), "Next");
        assert_eq!(third.last_message(), "Hello");
    }

    #[test]
    fn test_exhausted_sequence_attaches_nothing() {
        let (subject, transcript) = subject();
        let sequence = ObserverSequence::starting_at(u64::MAX);

        assert!(MessageObserver::new(&subject, &sequence).is_err());
        assert_eq!(subject.size(), 0);
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_detach_twice_is_noop() {
        let (subject, _transcript) = subject();
        let sequence = ObserverSequence::new();
        let first = MessageObserver::new(&subject, &sequence).unwrap();
        let _second = MessageObserver::new(&subject, &sequence).unwrap();

        assert!(subject.detach(first.as_ref()));
        assert_eq!(subject.size(), 1);
        assert!(!subject.detach(first.as_ref()));
        assert_eq!(subject.size(), 1);
    }

    #[test]
    fn test_notify_with_no_observers() {
        let (subject, transcript) = subject();
        subject.create_message("nobody listens");
        assert_eq!(transcript.lines(), vec!["There are 0 observers in the list."]);
        assert_eq!(subject.message(), "nobody listens");
    }

    #[test]
    fn test_default_message_and_business_logic() {
        let (subject, transcript) = subject();
        let sequence = ObserverSequence::new();
        let observer = MessageObserver::new(&subject, &sequence).unwrap();

        subject.create_default_message();
        assert_eq!(observer.last_message(), "Empty");

        transcript.take();
        subject.some_business_logic();
        assert_eq!(
            transcript.lines(),
            vec![
                "There are 1 observers in the list.",
                "Observer \"1\" a new message is available --> change message",
                "I'm about to do something important.",
            ]
        );
    }

    #[test]
    fn test_attach_twice_delivers_twice() {
        let (subject, _transcript) = subject();
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder::attach(&subject, "a", &log, false);
        subject.attach(recorder.clone());
        assert_eq!(subject.size(), 2);

        subject.create_message("x");
        assert_eq!(*log.borrow(), vec!["a:x", "a:x"]);

        subject.detach(recorder.as_ref());
        assert_eq!(subject.size(), 1);
        assert!(subject.is_attached(recorder.as_ref()));
    }

    #[test]
    fn test_self_detach_during_notify() {
        let (subject, _transcript) = subject();
        let log = Rc::new(RefCell::new(Vec::new()));
        let _a = Recorder::attach(&subject, "a", &log, false);
        let b = Recorder::attach(&subject, "b", &log, true);
        let _c = Recorder::attach(&subject, "c", &log, false);

        subject.create_message("1");
        assert_eq!(*log.borrow(), vec!["a:1", "b:1", "c:1"]);
        assert_eq!(subject.size(), 2);
        assert!(!subject.is_attached(b.as_ref()));

        log.borrow_mut().clear();
        subject.create_message("2");
        assert_eq!(*log.borrow(), vec!["a:2", "c:2"]);
    }

    #[test]
    fn test_detaching_a_later_observer_mid_pass_keeps_snapshot() {
        let (subject, _transcript) = subject();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::attach(&subject, "a", &log, false);
        let b = Recorder::attach(&subject, "b", &log, false);
        *a.victim.borrow_mut() = Some(b.clone());

        subject.create_message("1");
        assert_eq!(*log.borrow(), vec!["a:1", "b:1"]);
        assert_eq!(subject.size(), 1);

        log.borrow_mut().clear();
        subject.create_message("2");
        assert_eq!(*log.borrow(), vec!["a:2"]);
    }

    #[test]
    fn test_attach_during_notify_waits_for_next_pass() {
        struct Spawner {
            subject: Weak<Subject>,
            spawned: Cell<bool>,
            log: Rc<RefCell<Vec<String>>>,
        }

        impl Observer for Spawner {
            fn update(&self, message: &str) {
                self.log.borrow_mut().push(format!("spawner:{message}"));
                if !self.spawned.replace(true) {
                    if let Some(subject) = self.subject.upgrade() {
                        Recorder::attach(&subject, "late", &self.log, false);
                    }
                }
            }
        }

        let (subject, _transcript) = subject();
        let log = Rc::new(RefCell::new(Vec::new()));
        subject.attach(Rc::new(Spawner {
            subject: Rc::downgrade(&subject),
            spawned: Cell::new(false),
            log: Rc::clone(&log),
        }));

        subject.create_message("1");
        assert_eq!(*log.borrow(), vec!["spawner:1"]);

        subject.create_message("2");
        assert_eq!(*log.borrow(), vec!["spawner:1", "spawner:2", "late:2"]);
    }

    #[test]
    fn test_goodbye_only_after_detach_and_drop() {
        let (subject, transcript) = subject();
        let sequence = ObserverSequence::new();
        let observer = MessageObserver::new(&subject, &sequence).unwrap();

        observer.remove_me_from_the_list();
        transcript.take();
        drop(observer);
        assert_eq!(transcript.lines(), vec!["Goodbye, I was the Observer \"1\""]);
    }

    #[test]
    fn test_attached_observer_outlives_caller_handle() {
        let (subject, transcript) = subject();
        let sequence = ObserverSequence::new();
        drop(MessageObserver::new(&subject, &sequence).unwrap());

        transcript.take();
        subject.create_message("still here");
        assert_eq!(
            transcript.lines()[1],
            "Observer \"1\" a new message is available --> still here"
        );
    }

    #[test]
    fn test_remove_after_subject_dropped() {
        let (subject, transcript) = subject();
        let sequence = ObserverSequence::new();
        let observer = MessageObserver::new(&subject, &sequence).unwrap();
        subject.detach(observer.as_ref());
        drop(subject);

        observer.remove_me_from_the_list();
        assert!(transcript
            .lines()
            .contains(&"Observer \"1\" removed from the list.".to_string()));
    }

    proptest! {
        #[test]
        fn test_numbers_unique_across_detaches(ops in prop::collection::vec(any::<bool>(), 1..50)) {
            let (subject, _transcript) = subject();
            let sequence = ObserverSequence::new();
            let mut numbers = Vec::new();
            let mut alive: Vec<Rc<MessageObserver>> = Vec::new();

            for create in ops {
                if create || alive.is_empty() {
                    let observer = MessageObserver::new(&subject, &sequence).unwrap();
                    numbers.push(observer.number());
                    alive.push(observer);
                } else {
                    let observer = alive.remove(0);
                    observer.remove_me_from_the_list();
                }
            }

            for pair in numbers.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            prop_assert_eq!(subject.size(), alive.len());
        }

        #[test]
        fn test_delivery_follows_attachment_order(count in 0usize..20) {
            let (subject, _transcript) = subject();
            let log = Rc::new(RefCell::new(Vec::new()));
            let names: Vec<&'static str> = ["a", "b", "c", "d", "e"]
                .iter()
                .cycle()
                .take(count)
                .copied()
                .collect();
            let _recorders: Vec<_> = names
                .iter()
                .map(|&name| Recorder::attach(&subject, name, &log, false))
                .collect();

            subject.create_message("m");
            let expected: Vec<String> = names.iter().map(|name| format!("{name}:m")).collect();
            prop_assert_eq!(log.borrow().clone(), expected);
        }
    }
}
