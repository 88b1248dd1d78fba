use std::cell::RefCell;
use std::collections::VecDeque;

use super::types::{GenerationRequest, TextGenerator};
use super::BackendFailure;
use crate::models::enums::ProviderKind;

/// Mock generator for testing. Replays scripted outcomes and records prompts.
///
/// Once the script is exhausted the last outcome repeats.
pub struct MockGenerator {
    provider: ProviderKind,
    script: RefCell<VecDeque<Result<String, BackendFailure>>>,
    last: RefCell<Option<Result<String, BackendFailure>>>,
    prompts: RefCell<Vec<String>>,
}

impl MockGenerator {
    /// Always answers with `response`.
    pub fn new(provider: ProviderKind, response: &str) -> Self {
        Self::scripted(provider, vec![Ok(response.to_string())])
    }

    /// Always fails with `failure`.
    pub fn failing(provider: ProviderKind, failure: BackendFailure) -> Self {
        Self::scripted(provider, vec![Err(failure)])
    }

    pub fn scripted(provider: ProviderKind, outcomes: Vec<Result<String, BackendFailure>>) -> Self {
        Self {
            provider,
            script: RefCell::new(outcomes.into()),
            last: RefCell::new(None),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.borrow().len()
    }
}

impl TextGenerator for MockGenerator {
    fn provider(&self) -> ProviderKind {
        self.provider
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendFailure> {
        self.prompts.borrow_mut().push(request.prompt.to_string());

        let next = self.script.borrow_mut().pop_front();
        match next {
            Some(outcome) => {
                *self.last.borrow_mut() = Some(outcome.clone());
                outcome
            }
            None => self
                .last
                .borrow()
                .clone()
                .unwrap_or_else(|| Err(BackendFailure::other("mock script is empty"))),
        }
    }
}
