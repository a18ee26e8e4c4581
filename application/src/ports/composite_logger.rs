//! Composite conversation logger: delegates to multiple loggers.
//!
//! Used to write the same run to both the iteration-history log and the
//! full transcript log.

use super::conversation_logger::{ConversationEvent, ConversationLogger};
use std::sync::Arc;

/// A logger that hands every event to each inner logger, in order.
pub struct CompositeConversationLogger {
    delegates: Vec<Arc<dyn ConversationLogger>>,
}

impl CompositeConversationLogger {
    pub fn new(delegates: Vec<Arc<dyn ConversationLogger>>) -> Self {
        Self { delegates }
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl ConversationLogger for CompositeConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Some((last, rest)) = self.delegates.split_last() else {
            return;
        };
        for logger in rest {
            logger.log(event.clone());
        }
        last.log(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<&'static str>>);

    impl ConversationLogger for Recording {
        fn log(&self, event: ConversationEvent) {
            self.0.lock().unwrap().push(event.event_type);
        }
    }

    #[test]
    fn test_fans_out_to_every_delegate() {
        let a = Arc::new(Recording::default());
        let b = Arc::new(Recording::default());
        let composite = CompositeConversationLogger::new(vec![a.clone(), b.clone()]);

        composite.log(ConversationEvent::new("plan_generated", serde_json::json!({})));
        composite.log(ConversationEvent::new("run_complete", serde_json::json!({})));

        assert_eq!(*a.0.lock().unwrap(), vec!["plan_generated", "run_complete"]);
        assert_eq!(*b.0.lock().unwrap(), vec!["plan_generated", "run_complete"]);
    }

    #[test]
    fn test_empty_is_noop() {
        let composite = CompositeConversationLogger::new(Vec::new());
        assert!(composite.is_empty());
        composite.log(ConversationEvent::new("x", serde_json::Value::Null));
    }
}
