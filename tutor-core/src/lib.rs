//! tutor-core: Learning session orchestration engine
//!
//! This crate implements the teach, practice, assess, transfer-test loop for
//! an AI tutoring system:
//!
//! - **Session management** - [`Session`] and [`SessionManager`] for per-session
//!   state with serialized turns
//! - **Orchestration** - [`Orchestrator`] driving the state machine for each turn
//! - **Grading** - [`AssessmentGrader`] trait and [`RubricGrader`] mapping answers
//!   to the A/B/C confidence levels
//! - **Attempt tracking** - [`AttemptTracker`] for consecutive-failure counting
//!   and remediation triggering
//! - **Mastery ledger** - [`MasteryLedger`] trait and [`MemoryMasteryLedger`]
//!   for per-(student, item) mastery records
//! - **Event system** - [`EventBus`] trait and [`MemoryEventBus`] for
//!   observability events
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tutor_catalog::{MemoryCatalog, Subject};
//! use tutor_core::completion::MockCompletion;
//! use tutor_core::events::MemoryEventBus;
//! use tutor_core::grading::RubricGrader;
//! use tutor_core::teaching::PromptedTeaching;
//! use tutor_core::{
//!     MemoryAttemptStore, MemoryMasteryLedger, Orchestrator, SessionManager, TutorConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TutorConfig::default();
//! let completion = Arc::new(MockCompletion::new());
//! let events = Arc::new(MemoryEventBus::new());
//!
//! let orchestrator = Arc::new(Orchestrator::new(
//!     Arc::new(MemoryCatalog::new()),
//!     Arc::new(RubricGrader::new(completion.clone(), config.clone())),
//!     Arc::new(PromptedTeaching::new(completion, config.clone())),
//!     Arc::new(MemoryMasteryLedger::new()),
//!     Arc::new(MemoryAttemptStore::new()),
//!     events.clone(),
//!     config,
//! ));
//! let manager = SessionManager::new(orchestrator, events);
//!
//! let (session_id, welcome) = manager.create_session("student-1", Subject::Mathematics).await;
//! println!("{welcome}");
//! let reply = manager.handle_turn(&session_id, "quadratic equations").await?;
//! println!("{}", reply.reply);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   SessionManager                      │
//! │  ┌──────────────────────────────────────────────────┐│
//! │  │                  Orchestrator                    ││
//! │  │   intent → state machine → teaching / grading    ││
//! │  │  ┌──────────┐ ┌─────────┐ ┌────────┐ ┌────────┐ ││
//! │  │  │ Catalog  │ │ Grader  │ │ Ledger │ │ Events │ ││
//! │  │  └──────────┘ └─────────┘ └────────┘ └────────┘ ││
//! │  └──────────────────────────────────────────────────┘│
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod attempts;
pub mod completion;
pub mod config;
pub mod error;
pub mod events;
pub mod grading;
pub mod intent;
pub mod ledger;
pub mod session;
pub mod teaching;
pub mod tracker;

// Re-export key types for convenience
pub use attempts::{Attempt, AttemptStore, MemoryAttemptStore};
pub use completion::{CompletionCapability, PromptContext, PromptMessage, Role};
pub use config::TutorConfig;
pub use error::{CompletionError, GraderError, LedgerError, SessionError, TutorError};
pub use events::{EventBus, EventRecord, EventSeq, MemoryEventBus, TutorEvent};
pub use grading::{AssessmentGrader, GradeLevel, GradedAnswer, RubricGrader};
pub use intent::{Intent, IntentClassifier};
pub use ledger::{MasteryLedger, MasteryRecord, MemoryMasteryLedger};
pub use session::{Orchestrator, Session, SessionManager, SessionState, TurnReply};
pub use teaching::{PromptedTeaching, TeachingStrategy};
pub use tracker::AttemptTracker;
