//! The learning-loop orchestrator
//!
//! Owns a turn from utterance to reply: resolves intent, drives the state
//! machine, invokes the teaching strategy or the grader, updates the attempt
//! tracker and mastery ledger, and emits events. This is the single entry
//! point consumed by the transport layer.
//!
//! Failure policy: completion-channel failures (timeout, unavailable,
//! unparseable grader output) abort the turn with a fail-soft reply, leave
//! the session state unchanged, and write no Attempt. They are never counted
//! as student failures.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use tutor_catalog::{KnowledgeCatalog, KnowledgeItem, Question, QuestionFilter, QuestionType, Subject};

use super::state::{Session, SessionState};
use crate::attempts::{Attempt, AttemptStore};
use crate::completion::PromptMessage;
use crate::config::TutorConfig;
use crate::error::TutorError;
use crate::events::{EventBus, TutorEvent};
use crate::grading::{AssessmentGrader, GradeLevel, GradedAnswer};
use crate::intent::{Intent, IntentClassifier};
use crate::ledger::{MasteryLedger, MasteryRecord};
use crate::teaching::TeachingStrategy;

/// Reply produced by one turn
#[derive(Debug, Clone)]
pub struct TurnReply {
    /// Text shown to the student
    pub reply: String,
    /// Session state after the turn
    pub state: SessionState,
    /// Grading result, when this turn graded an answer
    pub graded: Option<GradedAnswer>,
    /// Question now pending, when this turn asked one
    pub question: Option<Question>,
    /// Whether this turn mastered the current item
    pub mastered: bool,
}

impl TurnReply {
    fn text(reply: impl Into<String>, state: SessionState) -> Self {
        Self {
            reply: reply.into(),
            state,
            graded: None,
            question: None,
            mastered: false,
        }
    }
}

/// Per-session orchestration engine
///
/// Stateless across sessions: all per-session data lives in [`Session`], so
/// one orchestrator instance serves every concurrent session.
pub struct Orchestrator {
    catalog: Arc<dyn KnowledgeCatalog>,
    grader: Arc<dyn AssessmentGrader>,
    teaching: Arc<dyn TeachingStrategy>,
    ledger: Arc<dyn MasteryLedger>,
    attempts: Arc<dyn AttemptStore>,
    events: Arc<dyn EventBus>,
    classifier: IntentClassifier,
    config: TutorConfig,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<dyn KnowledgeCatalog>,
        grader: Arc<dyn AssessmentGrader>,
        teaching: Arc<dyn TeachingStrategy>,
        ledger: Arc<dyn MasteryLedger>,
        attempts: Arc<dyn AttemptStore>,
        events: Arc<dyn EventBus>,
        config: TutorConfig,
    ) -> Self {
        let classifier = IntentClassifier::from_config(&config);
        Self {
            catalog,
            grader,
            teaching,
            ledger,
            attempts,
            events,
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Welcome message listing what can be studied in a subject
    pub async fn welcome(&self, subject: Subject) -> String {
        let items = self.catalog.list_items(subject).await;
        let mut text = format!(
            "Welcome to the {} learning space! I'm your tutor.\n\n",
            subject.display_name()
        );
        if items.is_empty() {
            text.push_str("No topics are available yet - check back soon.");
        } else {
            text.push_str("Topics you can study:\n");
            for item in &items {
                text.push_str("  - ");
                text.push_str(&item.title);
                text.push('\n');
            }
            text.push_str("\nTell me which topic you'd like to start with.");
        }
        text
    }

    /// Handle one user turn
    ///
    /// Side effects: at most one Attempt written, tracker counters updated,
    /// possibly one mastery upsert, events published. The catalog is never
    /// mutated. Failures degrade to a reply; they never crash the session.
    #[instrument(name = "session::turn", skip(self, session, utterance), fields(session_id = %session.id()))]
    pub async fn handle_turn(
        &self,
        session: &mut Session,
        utterance: &str,
    ) -> Result<TurnReply, TutorError> {
        if session.state() == SessionState::Ended {
            return Ok(TurnReply::text(
                "This session has ended. Start a new one to keep learning.",
                SessionState::Ended,
            ));
        }

        let intent = self.classifier.classify(utterance, session.state());
        debug!(state = session.state().as_str(), ?intent, "turn started");

        if intent == Intent::Exit {
            self.set_state(session, SessionState::Ended).await;
            return Ok(TurnReply::text(
                "Goodbye! Come back any time you want to keep learning.",
                SessionState::Ended,
            ));
        }

        // A mastered item is done; the next turn picks the next item
        if session.state() == SessionState::Mastered {
            session.set_item(None);
            session.set_question(None);
            self.set_state(session, SessionState::Selecting).await;
        }

        let outcome = match session.state() {
            SessionState::Selecting => self.handle_selecting(session, utterance).await?,
            SessionState::Teaching => match intent {
                Intent::StartPractice => self.start_practice(session).await?,
                _ => self.teach_reply(session, utterance).await?,
            },
            SessionState::Practicing => match intent {
                Intent::RequestHint => self.hint_reply(session).await?,
                _ => self.evaluate_answer(session, utterance, false).await?,
            },
            SessionState::TransferTesting => match intent {
                Intent::RequestHint => self.hint_reply(session).await?,
                _ => self.evaluate_answer(session, utterance, true).await?,
            },
            // Transient states are never durable between turns; treat a
            // session found here like a teaching continuation
            SessionState::Evaluating | SessionState::Remediating => {
                self.teach_reply(session, utterance).await?
            }
            SessionState::Mastered | SessionState::Ended => unreachable!("handled above"),
        };

        // History gains the exchange only after the turn resolved; the
        // strategies receive the utterance separately
        session.push_history(PromptMessage::user(utterance));
        session.push_history(PromptMessage::assistant(&outcome.reply));
        Ok(outcome)
    }

    // ==================== State handlers ====================

    /// Selecting: match the utterance against the subject's items
    async fn handle_selecting(
        &self,
        session: &mut Session,
        utterance: &str,
    ) -> Result<TurnReply, TutorError> {
        let items = self.catalog.list_items(session.subject()).await;
        let text = utterance.to_lowercase();

        let chosen = items.iter().find(|item| {
            text.contains(&item.title.to_lowercase()) || text.trim() == item.id.to_lowercase()
        });

        let Some(item) = chosen else {
            return Ok(TurnReply::text(
                self.welcome(session.subject()).await,
                session.state(),
            ));
        };

        // Generate the introduction before touching session state so a
        // channel failure leaves the turn without side effects
        let intro = match self
            .teaching
            .next_prompt(item, utterance, session.history(), false)
            .await
        {
            Ok(intro) => intro,
            Err(e) => return Ok(self.fail_soft(session, &e.to_string()).await),
        };

        session.set_item(Some(item.id.clone()));
        session.set_question(None);
        session.tracker_mut().reset();
        self.set_state(session, SessionState::Teaching).await;
        info!(item_id = %item.id, "knowledge item selected");

        Ok(TurnReply::text(intro, session.state()))
    }

    /// Teaching continuation: instructional reply for the utterance
    async fn teach_reply(
        &self,
        session: &mut Session,
        utterance: &str,
    ) -> Result<TurnReply, TutorError> {
        let item = match self.current_item(session).await {
            Ok(item) => item,
            Err(reply) => return Ok(reply),
        };

        match self
            .teaching
            .next_prompt(
                &item,
                utterance,
                session.history(),
                session.remediation_active(),
            )
            .await
        {
            Ok(reply) => Ok(TurnReply::text(reply, session.state())),
            Err(e) => Ok(self.fail_soft(session, &e.to_string()).await),
        }
    }

    /// Teaching + practice intent: pick the next practice question
    async fn start_practice(&self, session: &mut Session) -> Result<TurnReply, TutorError> {
        let item = match self.current_item(session).await {
            Ok(item) => item,
            Err(reply) => return Ok(reply),
        };

        let questions = self
            .catalog
            .list_questions(&item.id, QuestionFilter::practice())
            .await;
        if questions.is_empty() {
            return Ok(TurnReply::text(
                "There are no practice questions for this topic yet - let's keep studying instead.",
                session.state(),
            ));
        }

        // Deterministic pick: first question that isn't the one just asked
        let question = questions
            .iter()
            .find(|q| Some(q.id.as_str()) != session.question_id())
            .unwrap_or(&questions[0])
            .clone();

        session.set_question(Some(question.id.clone()));
        self.set_state(session, SessionState::Practicing).await;

        let reply = format!(
            "Let's try a practice question.\n\n{}\nType your answer, or ask for a hint.",
            question.format()
        );
        Ok(TurnReply {
            reply,
            state: session.state(),
            graded: None,
            question: Some(question),
            mastered: false,
        })
    }

    /// Hint request while a question is pending
    async fn hint_reply(&self, session: &mut Session) -> Result<TurnReply, TutorError> {
        let item = match self.current_item(session).await {
            Ok(item) => item,
            Err(reply) => return Ok(reply),
        };
        let question = match self.current_question(session).await {
            Ok(question) => question,
            Err(reply) => return Ok(reply),
        };

        match self.teaching.hints_for(&item, &question).await {
            Ok(hints) => Ok(TurnReply::text(
                format!("{}\n\nTake another look and give it a try.", hints),
                session.state(),
            )),
            Err(e) => Ok(self.fail_soft(session, &e.to_string()).await),
        }
    }

    /// Grade a submitted answer and route on the result
    async fn evaluate_answer(
        &self,
        session: &mut Session,
        answer: &str,
        transfer: bool,
    ) -> Result<TurnReply, TutorError> {
        let item = match self.current_item(session).await {
            Ok(item) => item,
            Err(reply) => return Ok(reply),
        };
        let question = match self.current_question(session).await {
            Ok(question) => question,
            Err(reply) => return Ok(reply),
        };

        // Grade before any state change: a grading-channel failure must
        // leave the session exactly as it was, with zero attempts written
        let graded = match self.grader.grade(&question, answer).await {
            Ok(graded) => graded,
            Err(e) => {
                warn!(error = %e, question_id = %question.id, "grading channel failed");
                return Ok(self.fail_soft(session, &e.to_string()).await);
            }
        };

        self.set_state(session, SessionState::Evaluating).await;

        let attempt = Attempt::new(
            session.id(),
            &question.id,
            answer,
            graded.level,
            graded.low_confidence,
        );
        self.attempts.record(attempt).await;
        self.events
            .publish(TutorEvent::Graded {
                session_id: session.id().to_string(),
                question_id: question.id.clone(),
                level: graded.level,
                at: Utc::now(),
            })
            .await;
        info!(question_id = %question.id, level = graded.level.as_str(), "answer graded");

        if transfer && question.question_type == QuestionType::Application {
            self.route_transfer_result(session, &item, graded).await
        } else {
            self.route_practice_result(session, &item, graded).await
        }
    }

    /// Routing after a transfer-test grade
    async fn route_transfer_result(
        &self,
        session: &mut Session,
        item: &KnowledgeItem,
        graded: GradedAnswer,
    ) -> Result<TurnReply, TutorError> {
        session.set_question(None);

        if graded.level == GradeLevel::A {
            session.tracker_mut().record_result(GradeLevel::A);
            self.master_item(session, item).await?;
            let reply = format!(
                "Transfer test passed - you've truly mastered \"{}\"!\n\n{}\n\n\
                 Tell me what you'd like to learn next.",
                item.title, graded.rationale,
            );
            return Ok(TurnReply {
                reply,
                state: session.state(),
                graded: Some(graded),
                question: None,
                mastered: true,
            });
        }

        // Anything below A on the transfer test counts as a C for the
        // consecutive-failure tally
        let feedback = format!(
            "{}\n\nNot quite there yet - let's go over the basics again before another try.",
            graded.rationale,
        );
        let reply = self.fail_toward_teaching(session, item, feedback).await;
        Ok(TurnReply {
            reply,
            state: session.state(),
            graded: Some(graded),
            question: None,
            mastered: false,
        })
    }

    /// Routing after a practice grade
    async fn route_practice_result(
        &self,
        session: &mut Session,
        item: &KnowledgeItem,
        graded: GradedAnswer,
    ) -> Result<TurnReply, TutorError> {
        match graded.level {
            GradeLevel::A => {
                session.tracker_mut().record_result(GradeLevel::A);
                let transfers = self
                    .catalog
                    .list_questions(&item.id, QuestionFilter::application())
                    .await;

                let Some(transfer) = transfers.first().cloned() else {
                    // Mastery strictly requires passing an application
                    // question; without one the student keeps practicing
                    session.set_question(None);
                    self.set_state(session, SessionState::Teaching).await;
                    let reply = format!(
                        "{}\n\nExcellent work! There's no transfer test for this topic yet, \
                         so let's deepen it further or pick another topic.",
                        graded.rationale,
                    );
                    return Ok(TurnReply {
                        reply,
                        state: session.state(),
                        graded: Some(graded),
                        question: None,
                        mastered: false,
                    });
                };

                session.set_question(Some(transfer.id.clone()));
                self.set_state(session, SessionState::TransferTesting).await;
                let reply = format!(
                    "{}\n\nYou've got the basics down. Now for the transfer test - \
                     apply what you learned:\n\n{}\nThink it through, then answer.",
                    graded.rationale,
                    transfer.format(),
                );
                Ok(TurnReply {
                    reply,
                    state: session.state(),
                    graded: Some(graded),
                    question: Some(transfer),
                    mastered: false,
                })
            }
            GradeLevel::B => {
                session.tracker_mut().record_result(GradeLevel::B);
                session.set_question(None);
                self.set_state(session, SessionState::Teaching).await;
                let reply = format!(
                    "{}\n\nGood - you're close. Let's firm up the details, \
                     then you can practice again.",
                    graded.rationale,
                );
                Ok(TurnReply {
                    reply,
                    state: session.state(),
                    graded: Some(graded),
                    question: None,
                    mastered: false,
                })
            }
            GradeLevel::C => {
                session.set_question(None);
                let feedback = format!(
                    "{}\n\nNo worries - let's work through it together.",
                    graded.rationale,
                );
                let reply = self.fail_toward_teaching(session, item, feedback).await;
                Ok(TurnReply {
                    reply,
                    state: session.state(),
                    graded: Some(graded),
                    question: None,
                    mastered: false,
                })
            }
        }
    }

    /// Count a failure and return to Teaching, via Remediating when the
    /// threshold is crossed
    async fn fail_toward_teaching(
        &self,
        session: &mut Session,
        item: &KnowledgeItem,
        feedback: String,
    ) -> String {
        let triggered = session.tracker_mut().record_result(GradeLevel::C);

        if !triggered {
            self.set_state(session, SessionState::Teaching).await;
            return feedback;
        }

        self.set_state(session, SessionState::Remediating).await;
        self.events
            .publish(TutorEvent::RemediationTriggered {
                session_id: session.id().to_string(),
                item_id: item.id.clone(),
                at: Utc::now(),
            })
            .await;
        info!(item_id = %item.id, "remediation triggered");

        let interlude = match self
            .teaching
            .remediation_interlude(item, self.config.failure_threshold)
            .await
        {
            Ok(text) => text,
            // The failure is already counted; degrade the interlude only
            Err(e) => {
                warn!(error = %e, "remediation interlude generation failed");
                "Let's take this from the top, one small step at a time.".to_string()
            }
        };

        self.set_state(session, SessionState::Teaching).await;
        format!("{}\n\nLet me explain this a different way:\n\n{}", feedback, interlude)
    }

    /// Mark the current item mastered; the orchestrator is the only writer
    async fn master_item(
        &self,
        session: &mut Session,
        item: &KnowledgeItem,
    ) -> Result<(), TutorError> {
        self.ledger
            .upsert(MasteryRecord {
                student_id: session.student_id().to_string(),
                item_id: item.id.clone(),
                mastered: true,
                mastered_at: Some(Utc::now()),
            })
            .await?;
        self.events
            .publish(TutorEvent::Mastered {
                session_id: session.id().to_string(),
                item_id: item.id.clone(),
                at: Utc::now(),
            })
            .await;
        self.set_state(session, SessionState::Mastered).await;
        info!(item_id = %item.id, "knowledge item mastered");
        Ok(())
    }

    // ==================== Helpers ====================

    /// Current knowledge item, or a fallback reply that re-enters Selecting
    async fn current_item(&self, session: &mut Session) -> Result<KnowledgeItem, TurnReply> {
        let Some(item_id) = session.item_id().map(str::to_string) else {
            return Err(self.reselect(session, "Let's pick a topic first.").await);
        };
        match self.catalog.get_item(&item_id).await {
            Ok(item) => Ok(item),
            Err(_) => {
                warn!(item_id = %item_id, "current knowledge item missing from catalog");
                Err(self
                    .reselect(session, "I couldn't find that topic anymore - let's pick another.")
                    .await)
            }
        }
    }

    /// Current question, or a fallback reply that re-enters Selecting
    async fn current_question(&self, session: &mut Session) -> Result<Question, TurnReply> {
        let Some(question_id) = session.question_id().map(str::to_string) else {
            return Err(self
                .reselect(session, "I lost track of the current question - let's restart.")
                .await)
        };
        match self.catalog.get_question(&question_id).await {
            Ok(question) => Ok(question),
            Err(_) => {
                warn!(question_id = %question_id, "current question missing from catalog");
                Err(self
                    .reselect(session, "I couldn't find that question anymore - let's restart.")
                    .await)
            }
        }
    }

    /// Catalog-miss fallback: drop back to re-selection
    async fn reselect(&self, session: &mut Session, note: &str) -> TurnReply {
        session.set_item(None);
        session.set_question(None);
        self.set_state(session, SessionState::Selecting).await;
        let listing = self.welcome(session.subject()).await;
        TurnReply::text(format!("{}\n\n{}", note, listing), session.state())
    }

    /// Fail-soft reply for a completion-channel failure: state unchanged,
    /// nothing written
    async fn fail_soft(&self, session: &Session, reason: &str) -> TurnReply {
        self.events
            .publish(TutorEvent::TurnFailed {
                session_id: session.id().to_string(),
                reason: reason.to_string(),
                at: Utc::now(),
            })
            .await;
        TurnReply::text(
            "I'm having trouble thinking right now - please try that again in a moment.",
            session.state(),
        )
    }

    /// Apply a transition and publish the state change if it happened
    async fn set_state(&self, session: &mut Session, to: SessionState) -> bool {
        if session.request_transition(to) {
            self.events
                .publish(TutorEvent::SessionStateChanged {
                    session_id: session.id().to_string(),
                    state: to.as_str().to_string(),
                    at: Utc::now(),
                })
                .await;
            true
        } else {
            debug!(from = session.state().as_str(), to = to.as_str(), "transition rejected");
            false
        }
    }
}
