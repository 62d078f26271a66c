//! Mode state machine deciding which surface the player sees.
//!
//! Every transition is an explicit [`ModeRequest`]. Accepted requests write the
//! new [`GameMode`] back to the host session and bump the controller epoch;
//! denied requests leave both untouched.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::fmt;
use thiserror::Error;

use crate::catalog::Region;
use crate::constants::ENCOUNTER_STREAM_TAG;
use crate::seed::derive_stream_seed;
use crate::state::{AnimalRecord, GameMode, SessionState};

/// What the controller needs from a session.
pub trait EncounterHost {
    fn current_region(&self) -> Option<Region>;

    /// Ids of every animal found on `region`, in catalog order.
    fn region_roster(&self, region: Region) -> Vec<&str>;

    fn is_captured(&self, id: &str) -> bool;

    fn mode(&self) -> GameMode;

    fn set_mode(&mut self, mode: GameMode);
}

impl EncounterHost for SessionState {
    fn current_region(&self) -> Option<Region> {
        self.region()
    }

    fn region_roster(&self, region: Region) -> Vec<&str> {
        self.list_by_region(region)
            .into_iter()
            .map(AnimalRecord::id)
            .collect()
    }

    fn is_captured(&self, id: &str) -> bool {
        Self::is_captured(self, id)
    }

    fn mode(&self) -> GameMode {
        Self::mode(self)
    }

    fn set_mode(&mut self, mode: GameMode) {
        Self::set_mode(self, mode);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModeState {
    #[default]
    Map,
    Encounter {
        animal_id: String,
    },
    Collection,
    Minigame {
        animal_id: String,
    },
}

impl ModeState {
    #[must_use]
    pub const fn mode(&self) -> GameMode {
        match self {
            Self::Map => GameMode::Map,
            Self::Encounter { .. } => GameMode::Encounter,
            Self::Collection => GameMode::Collection,
            Self::Minigame { .. } => GameMode::Minigame,
        }
    }

    /// Animal featured by the current surface, if any.
    #[must_use]
    pub fn animal_id(&self) -> Option<&str> {
        match self {
            Self::Encounter { animal_id } | Self::Minigame { animal_id } => Some(animal_id),
            Self::Map | Self::Collection => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeRequest {
    EnterEncounter,
    ExitEncounter,
    OpenCollection,
    CloseCollection,
    StartMinigame { animal_id: String },
    FinishMinigame,
}

impl ModeRequest {
    #[must_use]
    pub const fn target(&self) -> GameMode {
        match self {
            Self::EnterEncounter => GameMode::Encounter,
            Self::ExitEncounter | Self::CloseCollection => GameMode::Map,
            Self::OpenCollection | Self::FinishMinigame => GameMode::Collection,
            Self::StartMinigame { .. } => GameMode::Minigame,
        }
    }

    const fn source(&self) -> GameMode {
        match self {
            Self::EnterEncounter | Self::OpenCollection => GameMode::Map,
            Self::ExitEncounter => GameMode::Encounter,
            Self::CloseCollection | Self::StartMinigame { .. } => GameMode::Collection,
            Self::FinishMinigame => GameMode::Minigame,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenialReason {
    #[error("no region selected")]
    NoRegionSelected,
    #[error("animal {animal_id} is not in the collection")]
    AnimalNotCaptured { animal_id: String },
    #[error("no animals live on the {region} island")]
    NoEligibleAnimal { region: Region },
    #[error("cannot move from {from} to {to}")]
    IllegalTransition { from: GameMode, to: GameMode },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transition denied: {reason}")]
pub struct TransitionDenied {
    pub reason: DenialReason,
}

impl From<DenialReason> for TransitionDenied {
    fn from(reason: DenialReason) -> Self {
        Self { reason }
    }
}

/// Result of an accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: GameMode,
    pub state: ModeState,
    pub epoch: u64,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} (epoch {})", self.from, self.state.mode(), self.epoch)?;
        if let Some(id) = self.state.animal_id() {
            write!(f, " [{id}]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ModeController {
    state: ModeState,
    epoch: u64,
    seed: u64,
    rng: ChaCha20Rng,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ModeController {
    /// Start on the map. Encounter selection is reproducible for a given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: ModeState::Map,
            epoch: 0,
            seed,
            rng: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, ENCOUNTER_STREAM_TAG)),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ModeState {
        &self.state
    }

    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.state.mode()
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether a result tagged with `epoch` still belongs to the current surface.
    #[must_use]
    pub const fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Apply `request` against `host`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionDenied`] when the request is not legal from the
    /// current state or its precondition fails. Neither the controller nor
    /// the host changes in that case.
    pub fn request<H: EncounterHost>(
        &mut self,
        host: &mut H,
        request: ModeRequest,
    ) -> Result<Transition, TransitionDenied> {
        let from = self.mode();
        if request.source() != from {
            log::debug!("rejected {request:?} while in {from}");
            return Err(DenialReason::IllegalTransition {
                from,
                to: request.target(),
            }
            .into());
        }

        let next = match request {
            ModeRequest::EnterEncounter => ModeState::Encounter {
                animal_id: self.pick_encounter(host)?,
            },
            ModeRequest::ExitEncounter | ModeRequest::CloseCollection => ModeState::Map,
            ModeRequest::OpenCollection | ModeRequest::FinishMinigame => ModeState::Collection,
            ModeRequest::StartMinigame { animal_id } => {
                if !host.is_captured(&animal_id) {
                    return Err(DenialReason::AnimalNotCaptured { animal_id }.into());
                }
                ModeState::Minigame { animal_id }
            }
        };
        Ok(self.commit(host, from, next))
    }

    /// Re-align the controller with a session that was just loaded.
    ///
    /// Saves do not record the featured animal, so an encounter resumes on the
    /// map and a mini-game resumes in the collection.
    pub fn resume<H: EncounterHost>(&mut self, host: &mut H) -> Transition {
        let from = self.mode();
        let next = match host.mode() {
            GameMode::Map | GameMode::Encounter => ModeState::Map,
            GameMode::Collection | GameMode::Minigame => ModeState::Collection,
        };
        self.commit(host, from, next)
    }

    fn commit<H: EncounterHost>(
        &mut self,
        host: &mut H,
        from: GameMode,
        next: ModeState,
    ) -> Transition {
        host.set_mode(next.mode());
        self.state = next;
        self.epoch += 1;
        let transition = Transition {
            from,
            state: self.state.clone(),
            epoch: self.epoch,
        };
        log::debug!("mode transition {transition}");
        transition
    }

    fn pick_encounter<H: EncounterHost>(&mut self, host: &H) -> Result<String, DenialReason> {
        let region = host
            .current_region()
            .ok_or(DenialReason::NoRegionSelected)?;
        let roster = host.region_roster(region);
        if roster.is_empty() {
            return Err(DenialReason::NoEligibleAnimal { region });
        }
        let fresh: Vec<&str> = roster
            .iter()
            .copied()
            .filter(|id| !host.is_captured(id))
            .collect();
        let pool = if fresh.is_empty() { roster } else { fresh };
        let index = self.rng.random_range(0..pool.len());
        Ok(pool[index].to_string())
    }
}
