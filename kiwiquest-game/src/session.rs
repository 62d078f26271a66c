use crate::catalog::Region;
use crate::feeding::{FeedingOutcome, FoodCatalog, evaluate};
use crate::mode::{ModeController, ModeRequest, ModeState, Transition, TransitionDenied};
use crate::state::SessionState;

/// One player's session: the state plus the controller that drives it.
#[derive(Debug, Clone)]
pub struct PlaySession {
    state: SessionState,
    controller: ModeController,
    foods: FoodCatalog,
}

impl PlaySession {
    #[must_use]
    pub fn new(state: SessionState, foods: FoodCatalog, seed: u64) -> Self {
        Self {
            state,
            controller: ModeController::new(seed),
            foods,
        }
    }

    /// Wrap a freshly loaded state, moving it off any transient mode.
    #[must_use]
    pub fn resumed(state: SessionState, foods: FoodCatalog, seed: u64) -> Self {
        let mut session = Self::new(state, foods, seed);
        session.controller.resume(&mut session.state);
        session
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    #[must_use]
    pub const fn controller(&self) -> &ModeController {
        &self.controller
    }

    #[must_use]
    pub const fn foods(&self) -> &FoodCatalog {
        &self.foods
    }

    /// # Errors
    ///
    /// Returns [`TransitionDenied`] when the controller refuses the request.
    pub fn request(&mut self, request: ModeRequest) -> Result<Transition, TransitionDenied> {
        self.controller.request(&mut self.state, request)
    }

    pub fn select_region(&mut self, region: Region) {
        self.state.set_region(Some(region));
    }

    /// Capture the animal currently shown in an encounter.
    pub fn capture_encounter(&mut self) -> bool {
        match self.controller.state() {
            ModeState::Encounter { animal_id } => {
                let id = animal_id.clone();
                self.state.capture(&id)
            }
            _ => false,
        }
    }

    /// Offer a food by name. Unknown foods are rejected.
    pub fn offer_food(&mut self, animal_id: &str, food_name: &str) -> FeedingOutcome {
        let (Some(food), Some(animal)) = (self.foods.by_name(food_name), self.state.get(animal_id))
        else {
            return FeedingOutcome::REJECTED;
        };
        let outcome = evaluate(animal, food);
        if self.state.apply_feeding(animal_id, &outcome).is_none() {
            return FeedingOutcome::REJECTED;
        }
        outcome
    }

    /// Apply a mini-game reward to the featured animal, then return to the
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionDenied`] when no mini-game is running; no reward is
    /// applied in that case.
    pub fn finish_minigame(&mut self, reward: i32) -> Result<Transition, TransitionDenied> {
        if let ModeState::Minigame { animal_id } = self.controller.state() {
            let id = animal_id.clone();
            self.state.reward(&id, reward);
        }
        self.request(ModeRequest::FinishMinigame)
    }

    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }
}
