//! Gateway double driven by per-operation response scripts.
//!
//! Each operation pops the next scripted response. A response can be ready
//! immediately or gated, in which case the call suspends until the test
//! releases it through the returned [`Gate`]. Unscripted calls fail with a
//! transport error.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::domain::ports::{CrmGateway, GatewayError};
use crate::domain::{
    Company, CompanyId, CompanyPatch, CompanyStatus, CompanyStatusAck, Interaction,
    InteractionContent, NewCompany,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("scripted gateway mutex"),
    }
}

enum Scripted<T> {
    Ready(Result<T, GatewayError>),
    Gated(oneshot::Receiver<Result<T, GatewayError>>),
}

/// Releases one gated response.
#[derive(Debug)]
pub struct Gate<T> {
    sender: oneshot::Sender<Result<T, GatewayError>>,
}

impl<T> Gate<T> {
    pub fn succeed(self, value: T) {
        // The call may have been cancelled; nothing to release then.
        let _ = self.sender.send(Ok(value));
    }

    pub fn fail(self, error: GatewayError) {
        let _ = self.sender.send(Err(error));
    }
}

/// FIFO of responses for one gateway operation.
pub struct Script<T> {
    queue: Mutex<VecDeque<Scripted<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    pub fn push_ok(&self, value: T) {
        lock(&self.queue).push_back(Scripted::Ready(Ok(value)));
    }

    pub fn push_err(&self, error: GatewayError) {
        lock(&self.queue).push_back(Scripted::Ready(Err(error)));
    }

    /// Queue a response that is held until the returned gate is released.
    pub fn push_gated(&self) -> Gate<T> {
        let (sender, receiver) = oneshot::channel();
        lock(&self.queue).push_back(Scripted::Gated(receiver));
        Gate { sender }
    }

    pub fn remaining(&self) -> usize {
        lock(&self.queue).len()
    }

    async fn next(&self, operation: &str) -> Result<T, GatewayError> {
        let scripted = lock(&self.queue).pop_front();
        match scripted {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(receiver)) => receiver.await.unwrap_or_else(|_| {
                Err(GatewayError::transport(format!(
                    "gate for {operation} dropped without a response"
                )))
            }),
            None => Err(GatewayError::transport(format!(
                "no scripted response for {operation}"
            ))),
        }
    }
}

/// Gateway calls in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Companies,
    Company(CompanyId),
    Interactions(CompanyId),
    CreateCompany(String),
    UpdateCompany(CompanyId),
    UpdateCompanyStatus(CompanyId, CompanyStatus),
    DeleteCompany(CompanyId),
    CreateInteraction(CompanyId, String),
}

#[derive(Default)]
pub struct ScriptedGateway {
    calls: Mutex<Vec<GatewayCall>>,
    pub companies: Script<Vec<Company>>,
    pub company: Script<Option<Company>>,
    pub interactions: Script<Vec<Interaction>>,
    pub create_company: Script<Company>,
    pub update_company: Script<Company>,
    pub statuses: Script<CompanyStatusAck>,
    pub deletions: Script<bool>,
    pub create_interaction: Script<Interaction>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn record(&self, call: GatewayCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl CrmGateway for ScriptedGateway {
    async fn companies(&self) -> Result<Vec<Company>, GatewayError> {
        self.record(GatewayCall::Companies);
        self.companies.next("companies").await
    }

    async fn company(&self, id: &CompanyId) -> Result<Option<Company>, GatewayError> {
        self.record(GatewayCall::Company(id.clone()));
        self.company.next("company").await
    }

    async fn interactions(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Interaction>, GatewayError> {
        self.record(GatewayCall::Interactions(company_id.clone()));
        self.interactions.next("interactions").await
    }

    async fn create_company(&self, input: &NewCompany) -> Result<Company, GatewayError> {
        self.record(GatewayCall::CreateCompany(input.name.as_str().to_owned()));
        self.create_company.next("createCompany").await
    }

    async fn update_company(
        &self,
        id: &CompanyId,
        _patch: &CompanyPatch,
    ) -> Result<Company, GatewayError> {
        self.record(GatewayCall::UpdateCompany(id.clone()));
        self.update_company.next("updateCompany").await
    }

    async fn update_company_status(
        &self,
        id: &CompanyId,
        status: CompanyStatus,
    ) -> Result<CompanyStatusAck, GatewayError> {
        self.record(GatewayCall::UpdateCompanyStatus(id.clone(), status));
        self.statuses.next("updateCompanyStatus").await
    }

    async fn delete_company(&self, id: &CompanyId) -> Result<bool, GatewayError> {
        self.record(GatewayCall::DeleteCompany(id.clone()));
        self.deletions.next("deleteCompany").await
    }

    async fn create_interaction(
        &self,
        company_id: &CompanyId,
        content: &InteractionContent,
    ) -> Result<Interaction, GatewayError> {
        self.record(GatewayCall::CreateInteraction(
            company_id.clone(),
            content.as_str().to_owned(),
        ));
        self.create_interaction.next("createInteraction").await
    }
}
