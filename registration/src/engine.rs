//! Registration engine: the single transition operation of the dialogue state machine.
//!
//! ```text
//! (no state) --/register--> AwaitingName
//! AwaitingName --valid name--> AwaitingConfirmation(candidate)
//! AwaitingName --invalid--> AwaitingName (re-prompt)
//! AwaitingConfirmation --yes/y--> commit --> (no state)
//! AwaitingConfirmation --no/n--> AwaitingName (candidate dropped)
//! AwaitingConfirmation --anything else--> AwaitingConfirmation (re-prompt)
//! ```
//!
//! The engine owns no transport and no state persistence: it takes the current state, produces
//! the next one plus reply text, and calls the player repository only at the commit. Every
//! failure resolves to a user-visible reply; nothing here returns a hard error to the chain.

use crate::player::NewPlayer;
use crate::repo::{PlayerRepository, RepositoryError};
use crate::state::{RegistrationState, RegistrationStep};
use crate::validator::{validate, NAME_MAX_CHARS, NAME_MIN_CHARS};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

// --- User-facing replies ---

const MSG_ASK_NAME: &str = "Welcome to TeleQuest! Let's create your player.\n\
First, what name would you like to use in the game?";
const MSG_ASK_ANOTHER_NAME: &str = "No problem! Please enter a different name:";
const MSG_YES_OR_NO: &str = "Please reply with 'yes' or 'no'.";
const MSG_CREATE_FAILED: &str =
    "There was an error creating your player. Please try again later.";
const MSG_BEGIN_FAILED: &str =
    "There was an error starting your registration. Please try again later.";
const MSG_ALREADY_REGISTERED: &str = "You are already registered.";

fn name_length_reply() -> String {
    format!(
        "Your name must be between {} and {} characters. Please try again.",
        NAME_MIN_CHARS, NAME_MAX_CHARS
    )
}

fn confirm_prompt(name: &str) -> String {
    format!(
        "Your player name will be \"{}\". Is that correct?\n\
Reply with 'yes' to confirm or 'no' to choose a different name.",
        name
    )
}

fn created_reply(name: &str) -> String {
    format!(
        "Welcome, {}! Your player has been created successfully.\n\
You can now start your adventure in TeleQuest!",
        name
    )
}

fn already_registered_reply(name: &str) -> String {
    format!("You are already registered as \"{}\".", name)
}

/// Result of one engine step: the state to persist (`None` means cleared) and the replies to
/// send, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: Option<RegistrationState>,
    pub replies: Vec<String>,
}

impl Transition {
    fn reply(state: Option<RegistrationState>, text: impl Into<String>) -> Self {
        Self {
            state,
            replies: vec![text.into()],
        }
    }
}

/// Drives the registration dialogue. Holds only the player repository; state load/save belongs
/// to the caller so the engine stays restartable and testable.
pub struct RegistrationEngine {
    players: Arc<dyn PlayerRepository>,
}

impl RegistrationEngine {
    pub fn new(players: Arc<dyn PlayerRepository>) -> Self {
        Self { players }
    }

    /// Starts a registration for the given user. Replies with the existing player's name when
    /// one is already registered (idempotent begin); otherwise produces a fresh AwaitingName
    /// state plus the name prompt. Calling this mid-flow restarts the dialogue.
    #[instrument(skip(self))]
    pub async fn begin(&self, user_id: i64, chat_id: i64) -> Transition {
        match self
            .players
            .find_by_external_user_id(&user_id.to_string())
            .await
        {
            Ok(Some(existing)) => {
                info!(user_id, player = %existing.name, "Registration begin: already registered");
                Transition::reply(None, already_registered_reply(&existing.name))
            }
            Ok(None) => {
                info!(user_id, chat_id, "Registration begin: awaiting name");
                Transition::reply(
                    Some(RegistrationState::awaiting_name(user_id, chat_id)),
                    MSG_ASK_NAME,
                )
            }
            Err(e) => {
                error!(user_id, error = %e, "Registration begin: player lookup failed");
                Transition::reply(None, MSG_BEGIN_FAILED)
            }
        }
    }

    /// Advances the dialogue by exactly one inbound message. Must not be re-entered
    /// concurrently for the same user; callers serialize per user id (see [`crate::UserGate`]).
    #[instrument(skip(self, state, raw_text), fields(user_id = state.user_id))]
    pub async fn advance(&self, state: RegistrationState, raw_text: &str) -> Transition {
        match state.step {
            RegistrationStep::AwaitingName => self.advance_awaiting_name(state, raw_text),
            RegistrationStep::AwaitingConfirmation { ref candidate_name } => {
                let candidate_name = candidate_name.clone();
                self.advance_awaiting_confirmation(state, candidate_name, raw_text)
                    .await
            }
        }
    }

    fn advance_awaiting_name(&self, state: RegistrationState, raw_text: &str) -> Transition {
        match validate(raw_text) {
            Ok(name) => {
                info!(user_id = state.user_id, candidate = %name, "Name accepted, awaiting confirmation");
                let prompt = confirm_prompt(&name);
                Transition::reply(
                    Some(RegistrationState::awaiting_confirmation(
                        state.user_id,
                        state.chat_id,
                        name,
                    )),
                    prompt,
                )
            }
            Err(rejection) => {
                info!(user_id = state.user_id, rejection = ?rejection, "Name rejected, re-prompting");
                Transition::reply(Some(state), name_length_reply())
            }
        }
    }

    async fn advance_awaiting_confirmation(
        &self,
        state: RegistrationState,
        candidate_name: String,
        raw_text: &str,
    ) -> Transition {
        match raw_text.trim().to_lowercase().as_str() {
            "yes" | "y" => self.commit(state, candidate_name).await,
            "no" | "n" => {
                info!(user_id = state.user_id, "Candidate name discarded, asking again");
                Transition::reply(
                    Some(RegistrationState::awaiting_name(
                        state.user_id,
                        state.chat_id,
                    )),
                    MSG_ASK_ANOTHER_NAME,
                )
            }
            _ => {
                info!(user_id = state.user_id, "Unrecognized confirmation, re-prompting");
                Transition::reply(Some(state), MSG_YES_OR_NO)
            }
        }
    }

    /// Commits the confirmed candidate name. A duplicate conflict means registration already
    /// completed elsewhere (e.g. a retried confirmation after a crash) and is treated as
    /// success; any other repository failure keeps the state so the user can repeat "yes".
    async fn commit(&self, state: RegistrationState, candidate_name: String) -> Transition {
        let new_player = NewPlayer {
            name: candidate_name,
            external_user_id: state.user_id.to_string(),
            external_chat_id: state.chat_id.to_string(),
        };

        match self.players.create(new_player).await {
            Ok(player) => {
                info!(
                    user_id = state.user_id,
                    player_id = player.id,
                    name = %player.name,
                    "Player created"
                );
                Transition::reply(None, created_reply(&player.name))
            }
            Err(RepositoryError::Duplicate(external_user_id)) => {
                info!(
                    user_id = state.user_id,
                    "Duplicate on commit, treating as already registered"
                );
                match self
                    .players
                    .find_by_external_user_id(&external_user_id)
                    .await
                {
                    Ok(Some(existing)) => {
                        Transition::reply(None, already_registered_reply(&existing.name))
                    }
                    _ => Transition::reply(None, MSG_ALREADY_REGISTERED),
                }
            }
            Err(RepositoryError::Unavailable(e)) => {
                warn!(
                    user_id = state.user_id,
                    error = %e,
                    "Player create failed, keeping confirmation state for retry"
                );
                Transition::reply(Some(state), MSG_CREATE_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory::InMemoryPlayerRepository;
    use crate::player::Player;
    use async_trait::async_trait;

    /// PlayerRepository that fails every call, for outage paths.
    struct UnavailableRepository;

    #[async_trait]
    impl PlayerRepository for UnavailableRepository {
        async fn find_by_external_user_id(
            &self,
            _external_user_id: &str,
        ) -> Result<Option<Player>, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        async fn create(&self, _new_player: NewPlayer) -> Result<Player, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }
    }

    fn engine() -> (RegistrationEngine, Arc<InMemoryPlayerRepository>) {
        let repo = Arc::new(InMemoryPlayerRepository::new());
        (RegistrationEngine::new(repo.clone()), repo)
    }

    fn confirmation_state(name: &str) -> RegistrationState {
        RegistrationState::awaiting_confirmation(1, 10, name.to_string())
    }

    #[tokio::test]
    async fn test_begin_creates_awaiting_name_state() {
        let (engine, _repo) = engine();
        let t = engine.begin(1, 10).await;
        assert_eq!(t.state, Some(RegistrationState::awaiting_name(1, 10)));
        assert_eq!(t.replies.len(), 1);
        assert!(t.replies[0].contains("what name"));
    }

    #[tokio::test]
    async fn test_begin_for_registered_user_is_informational() {
        let (engine, repo) = engine();
        repo.create(NewPlayer {
            name: "Alice".to_string(),
            external_user_id: "1".to_string(),
            external_chat_id: "10".to_string(),
        })
        .await
        .unwrap();

        let t = engine.begin(1, 10).await;
        assert_eq!(t.state, None);
        assert!(t.replies[0].contains("already registered"));
        assert!(t.replies[0].contains("Alice"));
    }

    #[tokio::test]
    async fn test_begin_when_repository_down_keeps_no_state() {
        let engine = RegistrationEngine::new(Arc::new(UnavailableRepository));
        let t = engine.begin(1, 10).await;
        assert_eq!(t.state, None);
        assert!(t.replies[0].contains("try again later"));
    }

    #[tokio::test]
    async fn test_valid_name_moves_to_confirmation() {
        let (engine, _repo) = engine();
        let t = engine
            .advance(RegistrationState::awaiting_name(1, 10), "Alice")
            .await;
        assert_eq!(
            t.state,
            Some(RegistrationState::awaiting_confirmation(
                1,
                10,
                "Alice".to_string()
            ))
        );
        assert!(t.replies[0].contains("\"Alice\""));
    }

    #[tokio::test]
    async fn test_invalid_name_stays_awaiting_name() {
        let (engine, _repo) = engine();
        let state = RegistrationState::awaiting_name(1, 10);

        for bad in ["Al", "", "   ", &"x".repeat(21)] {
            let t = engine.advance(state.clone(), bad).await;
            assert_eq!(t.state, Some(state.clone()), "input: {:?}", bad);
            assert!(t.replies[0].contains("between 3 and 20"));
        }
    }

    #[tokio::test]
    async fn test_name_is_trimmed_before_confirmation() {
        let (engine, _repo) = engine();
        let t = engine
            .advance(RegistrationState::awaiting_name(1, 10), "  Alice  ")
            .await;
        assert_eq!(t.state.unwrap().candidate_name(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_confirmation_accepts_case_insensitive_yes() {
        for yes in ["yes", "YES", "Yes", "y", "Y", " yes "] {
            let (engine, repo) = engine();
            let t = engine.advance(confirmation_state("Alice"), yes).await;
            assert_eq!(t.state, None, "input: {:?}", yes);
            assert!(t.replies[0].contains("Welcome, Alice"));
            let stored = repo.find_by_external_user_id("1").await.unwrap().unwrap();
            assert_eq!(stored.name, "Alice");
        }
    }

    #[tokio::test]
    async fn test_confirmation_no_discards_candidate() {
        for no in ["no", "NO", "n", "N"] {
            let (engine, repo) = engine();
            let t = engine.advance(confirmation_state("Alice"), no).await;
            assert_eq!(t.state, Some(RegistrationState::awaiting_name(1, 10)));
            assert!(t.replies[0].contains("different name"));
            assert!(repo.find_by_external_user_id("1").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_unrecognized_confirmation_reprompts_without_losing_candidate() {
        let (engine, repo) = engine();
        let state = confirmation_state("Alice");

        for text in ["nope", "maybe", "", "  ", "yess"] {
            let t = engine.advance(state.clone(), text).await;
            assert_eq!(t.state, Some(state.clone()), "input: {:?}", text);
            assert!(t.replies[0].contains("'yes' or 'no'"));
        }
        assert!(repo.find_by_external_user_id("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_stores_external_ids_from_state() {
        let (engine, repo) = engine();
        engine
            .advance(
                RegistrationState::awaiting_confirmation(42, 99, "Bob".to_string()),
                "yes",
            )
            .await;

        let player = repo.find_by_external_user_id("42").await.unwrap().unwrap();
        assert_eq!(player.external_user_id, "42");
        assert_eq!(player.external_chat_id, "99");
        assert_eq!(player.name, "Bob");
    }

    #[tokio::test]
    async fn test_duplicate_on_commit_is_success_by_idempotence() {
        let (engine, repo) = engine();

        // Two confirmations racing on the same stale state: both were read before either commit.
        let state = confirmation_state("Alice");
        let first = engine.advance(state.clone(), "yes").await;
        let second = engine.advance(state, "yes").await;

        assert_eq!(first.state, None);
        assert_eq!(second.state, None);
        assert!(second.replies[0].contains("already registered"));
        assert!(second.replies[0].contains("Alice"));

        // Exactly one player row for the external user id
        let stored = repo.find_by_external_user_id("1").await.unwrap().unwrap();
        assert_eq!(stored.id, 1);
    }

    #[tokio::test]
    async fn test_repository_outage_on_commit_preserves_state() {
        let engine = RegistrationEngine::new(Arc::new(UnavailableRepository));
        let state = confirmation_state("Alice");

        let t = engine.advance(state.clone(), "yes").await;
        assert_eq!(t.state, Some(state));
        assert!(t.replies[0].contains("try again later"));
    }
}
