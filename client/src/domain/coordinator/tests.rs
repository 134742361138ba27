//! Tests for the mutation coordinator.

use std::sync::Arc;

use rstest::{fixture, rstest};
use tokio::task::yield_now;

use super::*;
use crate::domain::ports::{
    CacheEventKind, CrmGateway, FixtureCrmGateway, MockCrmGateway, MockNavigator, MockNotifier,
    MockSessionProvider, QueryData, QueryKey,
};
use crate::domain::{
    BearerToken, CompanyDetailState, CompanyDraft, CompanyListState, CompanyName, CompanyPatch,
    ErrorCode, InteractionComposer, MutationPhase, Session,
};
use crate::outbound::cache::InMemoryQueryCache;
use crate::outbound::session::WatchSessionProvider;
use crate::test_support::presentation::{NavigationEvent, RecordingNavigator, RecordingNotifier};
use crate::test_support::scripted_gateway::{GatewayCall, ScriptedGateway};
use crate::test_support::{company, interaction};

struct Harness {
    gateway: Arc<ScriptedGateway>,
    cache: Arc<InMemoryQueryCache>,
    sessions: Arc<WatchSessionProvider>,
    navigator: Arc<RecordingNavigator>,
    notifier: Arc<RecordingNotifier>,
    coordinator: MutationCoordinator,
}

fn signed_in() -> Arc<WatchSessionProvider> {
    let token = BearerToken::new("test-token").expect("token");
    Arc::new(WatchSessionProvider::with_session(Session::new(token)))
}

fn build(
    gateway: Arc<dyn CrmGateway>,
    sessions: Arc<WatchSessionProvider>,
) -> (
    MutationCoordinator,
    Arc<InMemoryQueryCache>,
    Arc<RecordingNavigator>,
    Arc<RecordingNotifier>,
) {
    let cache = Arc::new(InMemoryQueryCache::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let coordinator = MutationCoordinator::with_presentation(
        CoordinatorPorts {
            gateway,
            cache: cache.clone(),
            sessions,
        },
        PresentationPorts {
            navigator: navigator.clone(),
            notifier: notifier.clone(),
        },
    );
    (coordinator, cache, navigator, notifier)
}

#[fixture]
fn harness() -> Harness {
    let gateway = Arc::new(ScriptedGateway::new());
    let sessions = signed_in();
    let (coordinator, cache, navigator, notifier) = build(gateway.clone(), sessions.clone());
    Harness {
        gateway,
        cache,
        sessions,
        navigator,
        notifier,
        coordinator,
    }
}

impl Harness {
    fn seed_companies(&self, companies: Vec<Company>) {
        self.cache
            .write(QueryKey::Companies, QueryData::Companies(companies))
            .expect("seed list");
    }

    fn seed_detail(&self, company: Company) {
        self.cache
            .write(
                QueryKey::Company(company.id.clone()),
                QueryData::Company(Some(company)),
            )
            .expect("seed detail");
    }

    fn cached_list(&self) -> Vec<Company> {
        self.coordinator.cached_companies().expect("list cached")
    }

    async fn wait_for_calls(&self, count: usize) {
        while self.gateway.call_count() < count {
            yield_now().await;
        }
    }
}

fn ack(id: i64, status: CompanyStatus) -> CompanyStatusAck {
    CompanyStatusAck {
        id: CompanyId::from(id),
        status,
    }
}

fn notice(kind: NoticeKind) -> UserNotice {
    UserNotice::localized(kind, NoticeLocale::En)
}

#[rstest]
#[tokio::test]
async fn status_success_reconciles_list_and_detail(harness: Harness) {
    let other = company(2, "Globex", CompanyStatus::Won);
    harness.seed_companies(vec![company(1, "Acme", CompanyStatus::Lead), other.clone()]);
    harness.seed_detail(company(1, "Acme", CompanyStatus::Lead));
    harness.gateway.statuses.push_ok(ack(1, CompanyStatus::Won));
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    let outcome = harness
        .coordinator
        .update_status(&detail, CompanyStatus::Won)
        .await
        .expect("session active");

    assert_eq!(outcome, MutationOutcome::Reconciled(ack(1, CompanyStatus::Won)));
    assert_eq!(detail.status(), CompanyStatus::Won);
    assert_eq!(detail.phase(), MutationPhase::Reconciled);
    let list = harness.cached_list();
    assert_eq!(list.first().map(|c| c.status), Some(CompanyStatus::Won));
    assert_eq!(list.get(1), Some(&other), "other entries stay untouched");
    let cached = harness
        .coordinator
        .cached_company(&CompanyId::from(1))
        .flatten()
        .expect("detail cached");
    assert_eq!(cached.status, CompanyStatus::Won);
    assert!(harness.notifier.notices().is_empty());
}

#[rstest]
#[tokio::test]
async fn status_failure_rolls_back_and_leaves_cache(harness: Harness) {
    let seeded = vec![company(1, "Acme", CompanyStatus::Lead)];
    harness.seed_companies(seeded.clone());
    harness
        .gateway
        .statuses
        .push_err(GatewayError::transport("connection reset"));
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    let outcome = harness
        .coordinator
        .update_status(&detail, CompanyStatus::Won)
        .await
        .expect("session active");

    let MutationOutcome::RolledBack { restored, error } = outcome else {
        panic!("expected rollback, got {outcome:?}");
    };
    assert_eq!(restored, CompanyStatus::Lead);
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(detail.status(), CompanyStatus::Lead);
    assert_eq!(detail.phase(), MutationPhase::RolledBack);
    assert_eq!(harness.cached_list(), seeded);
    assert_eq!(
        harness.notifier.notices(),
        vec![notice(NoticeKind::StatusUpdateFailed)]
    );
}

#[rstest]
#[tokio::test]
async fn status_is_displayed_before_the_server_answers(harness: Harness) {
    let gate = harness.gateway.statuses.push_gated();
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    let coordinator = harness.coordinator.clone();
    let task_detail = detail.clone();
    let task = tokio::spawn(async move {
        coordinator
            .update_status(&task_detail, CompanyStatus::Negotiating)
            .await
    });
    harness.wait_for_calls(1).await;

    assert_eq!(detail.status(), CompanyStatus::Negotiating);
    assert_eq!(detail.phase(), MutationPhase::OptimisticallyApplied);

    gate.succeed(ack(1, CompanyStatus::Negotiating));
    let outcome = task.await.expect("task joins").expect("session active");
    assert!(outcome.is_reconciled());
}

#[rstest]
#[tokio::test]
async fn overlapping_updates_resolve_in_order(harness: Harness) {
    let first_gate = harness.gateway.statuses.push_gated();
    let second_gate = harness.gateway.statuses.push_gated();
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    let spawn_update = |status| {
        let coordinator = harness.coordinator.clone();
        let detail = detail.clone();
        tokio::spawn(async move { coordinator.update_status(&detail, status).await })
    };

    let first = spawn_update(CompanyStatus::Negotiating);
    harness.wait_for_calls(1).await;
    let second = spawn_update(CompanyStatus::Won);
    for _ in 0..10 {
        yield_now().await;
    }
    assert_eq!(harness.gateway.call_count(), 1, "second call must wait");
    assert_eq!(detail.status(), CompanyStatus::Won);

    first_gate.fail(GatewayError::rejected("stale"));
    harness.wait_for_calls(2).await;
    assert_eq!(detail.status(), CompanyStatus::Won, "newest value stays displayed");

    second_gate.succeed(ack(1, CompanyStatus::Won));
    let first = first.await.expect("join").expect("session");
    let second = second.await.expect("join").expect("session");

    assert!(matches!(
        first,
        MutationOutcome::RolledBack {
            restored: CompanyStatus::Lead,
            ..
        }
    ));
    assert!(second.is_reconciled());
    assert_eq!(detail.status(), CompanyStatus::Won);
    assert_eq!(detail.phase(), MutationPhase::Reconciled);
    assert_eq!(
        harness.gateway.calls(),
        vec![
            GatewayCall::UpdateCompanyStatus(CompanyId::from(1), CompanyStatus::Negotiating),
            GatewayCall::UpdateCompanyStatus(CompanyId::from(1), CompanyStatus::Won),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn later_failure_restores_the_acknowledged_status(harness: Harness) {
    let first_gate = harness.gateway.statuses.push_gated();
    harness
        .gateway
        .statuses
        .push_err(GatewayError::timeout("30s"));
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    let coordinator = harness.coordinator.clone();
    let first_detail = detail.clone();
    let first = tokio::spawn(async move {
        coordinator
            .update_status(&first_detail, CompanyStatus::Negotiating)
            .await
    });
    harness.wait_for_calls(1).await;
    let coordinator = harness.coordinator.clone();
    let second_detail = detail.clone();
    let second = tokio::spawn(async move {
        coordinator
            .update_status(&second_detail, CompanyStatus::Lost)
            .await
    });
    yield_now().await;

    first_gate.succeed(ack(1, CompanyStatus::Negotiating));
    first.await.expect("join").expect("session");
    let second = second.await.expect("join").expect("session");

    assert!(matches!(
        second,
        MutationOutcome::RolledBack {
            restored: CompanyStatus::Negotiating,
            ..
        }
    ));
    assert_eq!(detail.status(), CompanyStatus::Negotiating);
}

#[rstest]
#[tokio::test]
async fn reconciliation_writes_reach_cache_subscribers(harness: Harness) {
    harness.seed_companies(vec![company(1, "Acme", CompanyStatus::Lead)]);
    harness.gateway.statuses.push_ok(ack(1, CompanyStatus::Won));
    let mut events = harness.cache.subscribe();
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    harness
        .coordinator
        .update_status(&detail, CompanyStatus::Won)
        .await
        .expect("session active");

    let event = events.try_recv().expect("write announced");
    assert_eq!(event.key, Some(QueryKey::Companies));
    assert_eq!(event.kind, CacheEventKind::Written);
}

#[tokio::test]
async fn operations_without_session_never_reach_the_gateway() {
    // A mock without expectations panics on any call.
    let gateway = Arc::new(MockCrmGateway::new());
    let (coordinator, _cache, _navigator, notifier) =
        build(gateway, Arc::new(WatchSessionProvider::new()));
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    let status = coordinator
        .update_status(&detail, CompanyStatus::Won)
        .await
        .expect_err("no session");
    let deletion = coordinator
        .delete_company(&CompanyId::from(1))
        .await
        .expect_err("no session");
    let listing = coordinator.load_companies().await.expect_err("no session");

    for error in [status, deletion, listing] {
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }
    assert_eq!(detail.status(), CompanyStatus::Lead);
    assert_eq!(detail.phase(), MutationPhase::Idle);
    assert_eq!(notifier.notices().len(), 3);
}

#[rstest]
#[tokio::test]
async fn delete_removes_company_everywhere_and_leaves_screen(harness: Harness) {
    let keep = company(2, "Globex", CompanyStatus::Won);
    harness.seed_companies(vec![company(1, "Acme", CompanyStatus::Lead), keep.clone()]);
    harness.seed_detail(company(1, "Acme", CompanyStatus::Lead));
    harness
        .cache
        .write(
            QueryKey::Interactions(CompanyId::from(1)),
            QueryData::Interactions(vec![interaction(10, 1, "Intro call", 1_000)]),
        )
        .expect("seed interactions");
    harness.gateway.deletions.push_ok(true);

    harness
        .coordinator
        .delete_company(&CompanyId::from(1))
        .await
        .expect("deleted");

    assert_eq!(harness.cached_list(), vec![keep]);
    assert!(harness.coordinator.cached_company(&CompanyId::from(1)).is_none());
    assert!(
        harness
            .coordinator
            .cached_interactions(&CompanyId::from(1))
            .is_none()
    );
    assert_eq!(
        harness.navigator.events(),
        vec![NavigationEvent::LeftCompany(CompanyId::from(1))]
    );
}

#[rstest]
#[tokio::test]
async fn deleting_an_uncached_company_leaves_cache_as_is(harness: Harness) {
    let remaining = vec![company(2, "Globex", CompanyStatus::Won)];
    harness.seed_companies(remaining.clone());
    harness.gateway.deletions.push_ok(true);

    harness
        .coordinator
        .delete_company(&CompanyId::from(1))
        .await
        .expect("deleted");

    assert_eq!(harness.cached_list(), remaining);
}

#[rstest]
#[case::declined(Ok(false))]
#[case::failed(Err(GatewayError::rejected("not allowed")))]
#[tokio::test]
async fn failed_delete_changes_nothing(
    harness: Harness,
    #[case] response: Result<bool, GatewayError>,
) {
    let seeded = vec![company(1, "Acme", CompanyStatus::Lead)];
    harness.seed_companies(seeded.clone());
    match response {
        Ok(value) => harness.gateway.deletions.push_ok(value),
        Err(error) => harness.gateway.deletions.push_err(error),
    }

    let error = harness
        .coordinator
        .delete_company(&CompanyId::from(1))
        .await
        .expect_err("delete fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(harness.cached_list(), seeded);
    assert!(harness.navigator.events().is_empty());
    assert_eq!(harness.notifier.notices(), vec![notice(NoticeKind::DeleteFailed)]);
}

#[rstest]
#[case::empty("")]
#[case::spaces("   ")]
#[case::newlines("\n\t\n")]
#[tokio::test]
async fn blank_interactions_are_never_sent(#[case] draft: &str) {
    let mut gateway = MockCrmGateway::new();
    gateway.expect_create_interaction().times(0);
    let (coordinator, _cache, _navigator, notifier) = build(Arc::new(gateway), signed_in());
    let composer = InteractionComposer::new(CompanyId::from(1));
    composer.set_draft(draft);

    let error = coordinator
        .create_interaction(&composer)
        .await
        .expect_err("blank draft");

    assert!(error.is_validation());
    assert!(!composer.is_sending());
    assert_eq!(notifier.notices(), vec![notice(NoticeKind::EmptyInteraction)]);
}

#[rstest]
#[tokio::test]
async fn sent_interaction_is_prepended_once(harness: Harness) {
    let company_id = CompanyId::from(1);
    let existing = interaction(10, 1, "First call", 1_000);
    harness
        .cache
        .write(
            QueryKey::Interactions(company_id.clone()),
            QueryData::Interactions(vec![existing.clone()]),
        )
        .expect("seed interactions");
    let created = interaction(11, 1, "Sent proposal", 2_000);
    harness.gateway.create_interaction.push_ok(created.clone());
    let composer = InteractionComposer::new(company_id.clone());
    composer.set_draft("  Sent proposal ");

    let returned = harness
        .coordinator
        .create_interaction(&composer)
        .await
        .expect("sent");

    assert_eq!(returned, created);
    assert_eq!(
        harness.coordinator.cached_interactions(&company_id),
        Some(vec![created, existing])
    );
    assert!(!composer.is_sending());
    assert_eq!(composer.draft(), "");
    assert_eq!(
        harness.gateway.calls(),
        vec![GatewayCall::CreateInteraction(
            company_id,
            "Sent proposal".to_owned()
        )]
    );
}

#[rstest]
#[tokio::test]
async fn interaction_for_uncached_list_creates_no_entry(harness: Harness) {
    harness
        .gateway
        .create_interaction
        .push_ok(interaction(11, 1, "Note", 2_000));
    let composer = InteractionComposer::new(CompanyId::from(1));
    composer.set_draft("Note");

    harness
        .coordinator
        .create_interaction(&composer)
        .await
        .expect("sent");

    assert!(harness
        .coordinator
        .cached_interactions(&CompanyId::from(1))
        .is_none());
}

#[rstest]
#[tokio::test]
async fn failed_interaction_keeps_draft_and_clears_sending(harness: Harness) {
    harness
        .gateway
        .create_interaction
        .push_err(GatewayError::timeout("30s"));
    let composer = InteractionComposer::new(CompanyId::from(1));
    composer.set_draft("Follow up next week");

    let error = harness
        .coordinator
        .create_interaction(&composer)
        .await
        .expect_err("send fails");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(composer.draft(), "Follow up next week");
    assert!(!composer.is_sending());
    assert_eq!(
        harness.notifier.notices(),
        vec![notice(NoticeKind::InteractionFailed)]
    );
}

#[rstest]
#[tokio::test]
async fn composer_is_sending_while_the_call_is_in_flight(harness: Harness) {
    let gate = harness.gateway.create_interaction.push_gated();
    let composer = InteractionComposer::new(CompanyId::from(1));
    composer.set_draft("Demo booked");

    let coordinator = harness.coordinator.clone();
    let task_composer = composer.clone();
    let task =
        tokio::spawn(async move { coordinator.create_interaction(&task_composer).await });
    harness.wait_for_calls(1).await;
    assert!(composer.is_sending());

    let overlapping = harness
        .coordinator
        .create_interaction(&composer)
        .await
        .expect_err("already sending");
    assert!(overlapping.is_validation());
    assert_eq!(harness.gateway.call_count(), 1);

    gate.succeed(interaction(12, 1, "Demo booked", 3_000));
    task.await.expect("join").expect("sent");
    assert!(!composer.is_sending());
}

#[rstest]
#[tokio::test]
async fn cancelled_send_clears_sending(harness: Harness) {
    let _gate = harness.gateway.create_interaction.push_gated();
    let composer = InteractionComposer::new(CompanyId::from(1));
    composer.set_draft("Will be cancelled");

    let coordinator = harness.coordinator.clone();
    let task_composer = composer.clone();
    let task =
        tokio::spawn(async move { coordinator.create_interaction(&task_composer).await });
    harness.wait_for_calls(1).await;
    assert!(composer.is_sending());

    task.abort();
    let _ = task.await;
    assert!(!composer.is_sending());
    assert_eq!(composer.draft(), "Will be cancelled");
}

#[tokio::test]
async fn blank_company_names_are_rejected_before_any_call() {
    let mut gateway = MockCrmGateway::new();
    gateway.expect_create_company().times(0);
    let (coordinator, _cache, navigator, notifier) = build(Arc::new(gateway), signed_in());

    let error = coordinator
        .create_company(&CompanyDraft::named("   "))
        .await
        .expect_err("blank name");

    assert!(error.is_validation());
    assert!(navigator.events().is_empty());
    assert_eq!(notifier.notices(), vec![notice(NoticeKind::EmptyCompanyName)]);
}

#[rstest]
#[tokio::test]
async fn created_company_joins_cached_list(harness: Harness) {
    harness.seed_companies(vec![company(1, "Acme", CompanyStatus::Lead)]);
    let created = company(3, "Initech", CompanyStatus::Lead);
    harness.gateway.create_company.push_ok(created.clone());

    let returned = harness
        .coordinator
        .create_company(&CompanyDraft::named(" Initech "))
        .await
        .expect("created");

    assert_eq!(returned, created);
    let list = harness.cached_list();
    assert_eq!(list.len(), 2);
    assert_eq!(list.last(), Some(&created));
    assert_eq!(
        harness.coordinator.cached_company(&CompanyId::from(3)),
        Some(Some(created))
    );
    assert_eq!(
        harness.gateway.calls(),
        vec![GatewayCall::CreateCompany("Initech".to_owned())]
    );
    assert_eq!(harness.navigator.events(), vec![NavigationEvent::ReturnedToList]);
}

#[rstest]
#[tokio::test]
async fn empty_edit_is_rejected(harness: Harness) {
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    let error = harness
        .coordinator
        .edit_company(&detail, &CompanyPatch::default())
        .await
        .expect_err("empty patch");

    assert!(error.is_validation());
    assert_eq!(harness.gateway.call_count(), 0);
}

#[rstest]
#[tokio::test]
async fn edit_replaces_company_everywhere(harness: Harness) {
    harness.seed_companies(vec![company(1, "Acme", CompanyStatus::Lead)]);
    harness.seed_detail(company(1, "Acme", CompanyStatus::Lead));
    let mut edited = company(1, "Acme Corp", CompanyStatus::Lead);
    edited.website = Some("https://acme.example".to_owned());
    harness.gateway.update_company.push_ok(edited.clone());
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));
    let patch = CompanyPatch {
        name: Some(CompanyName::new("Acme Corp").expect("name")),
        website: Some("https://acme.example".to_owned()),
        ..CompanyPatch::default()
    };

    harness
        .coordinator
        .edit_company(&detail, &patch)
        .await
        .expect("edited");

    assert_eq!(harness.cached_list(), vec![edited.clone()]);
    assert_eq!(
        harness.coordinator.cached_company(&CompanyId::from(1)),
        Some(Some(edited.clone()))
    );
    assert_eq!(detail.company(), edited);
}

#[rstest]
#[tokio::test]
async fn interactions_are_cached_newest_first(harness: Harness) {
    harness.gateway.interactions.push_ok(vec![
        interaction(1, 5, "oldest", 1_000),
        interaction(3, 5, "newest", 3_000),
        interaction(2, 5, "middle", 2_000),
    ]);

    let loaded = harness
        .coordinator
        .load_interactions(&CompanyId::from(5))
        .await
        .expect("loaded");

    let ids: Vec<_> = loaded.iter().map(|i| i.id.as_str().to_owned()).collect();
    assert_eq!(ids, ["3", "2", "1"]);
    assert_eq!(
        harness.coordinator.cached_interactions(&CompanyId::from(5)),
        Some(loaded)
    );
}

#[rstest]
#[tokio::test]
async fn load_company_caches_absence(harness: Harness) {
    harness.gateway.company.push_ok(None);

    let loaded = harness
        .coordinator
        .load_company(&CompanyId::from(9))
        .await
        .expect("loaded");

    assert!(loaded.is_none());
    assert_eq!(
        harness.coordinator.cached_company(&CompanyId::from(9)),
        Some(None)
    );
}

#[rstest]
#[tokio::test]
async fn refresh_flag_is_cleared_after_failure(harness: Harness) {
    harness
        .gateway
        .companies
        .push_err(GatewayError::transport("offline"));
    let list = CompanyListState::new();

    let error = harness
        .coordinator
        .refresh_companies(&list)
        .await
        .expect_err("refresh fails");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert!(!list.is_refreshing());
    assert_eq!(
        harness.notifier.notices(),
        vec![notice(NoticeKind::LoadCompaniesFailed)]
    );
}

#[rstest]
#[tokio::test]
async fn overlapping_refresh_reuses_cached_list(harness: Harness) {
    let cached = vec![company(1, "Acme", CompanyStatus::Lead)];
    harness.seed_companies(cached.clone());
    let gate = harness.gateway.companies.push_gated();
    let list = CompanyListState::new();

    let coordinator = harness.coordinator.clone();
    let task_list = list.clone();
    let task = tokio::spawn(async move { coordinator.refresh_companies(&task_list).await });
    harness.wait_for_calls(1).await;
    assert!(list.is_refreshing());

    let second = harness
        .coordinator
        .refresh_companies(&list)
        .await
        .expect("served from cache");
    assert_eq!(second, cached);
    assert_eq!(harness.gateway.call_count(), 1);

    let fresh = vec![company(2, "Globex", CompanyStatus::Won)];
    gate.succeed(fresh.clone());
    assert_eq!(task.await.expect("join").expect("loaded"), fresh);
    assert!(!list.is_refreshing());
    assert_eq!(harness.cached_list(), fresh);
}

#[rstest]
#[tokio::test]
async fn sign_out_clears_session_and_cache(harness: Harness) {
    harness.seed_companies(vec![company(1, "Acme", CompanyStatus::Lead)]);

    harness.coordinator.sign_out().await;

    assert!(harness.sessions.current_session().is_none());
    assert!(harness.cache.keys().is_empty());
    assert_eq!(harness.navigator.events(), vec![NavigationEvent::SignIn]);
}

#[rstest]
#[tokio::test]
async fn responses_arriving_after_sign_out_are_not_cached(harness: Harness) {
    let gate = harness.gateway.companies.push_gated();
    let coordinator = harness.coordinator.clone();
    let task = tokio::spawn(async move { coordinator.load_companies().await });
    harness.wait_for_calls(1).await;

    harness.coordinator.sign_out().await;
    gate.succeed(vec![company(1, "Acme", CompanyStatus::Lead)]);
    let loaded = task.await.expect("join").expect("server answered");

    assert_eq!(loaded.len(), 1);
    assert!(harness.coordinator.cached_companies().is_none());
    assert!(harness.cache.keys().is_empty());
}

#[rstest]
#[tokio::test]
async fn responses_for_a_previous_user_are_not_cached(harness: Harness) {
    harness.seed_companies(vec![company(1, "Acme", CompanyStatus::Lead)]);
    let gate = harness.gateway.statuses.push_gated();
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));
    let coordinator = harness.coordinator.clone();
    let task_detail = detail.clone();
    let task = tokio::spawn(async move {
        coordinator
            .update_status(&task_detail, CompanyStatus::Won)
            .await
    });
    harness.wait_for_calls(1).await;

    harness.coordinator.sign_out().await;
    let token = BearerToken::new("next-user").expect("token");
    harness.sessions.sign_in(Session::new(token));
    harness.seed_companies(vec![company(7, "Initech", CompanyStatus::Lead)]);
    gate.succeed(ack(1, CompanyStatus::Won));
    task.await.expect("join").expect("session active");

    assert_eq!(
        harness.cached_list(),
        vec![company(7, "Initech", CompanyStatus::Lead)]
    );
    assert!(harness.coordinator.cached_company(&CompanyId::from(1)).is_none());
}

#[tokio::test]
async fn sign_out_goes_through_the_session_provider() {
    let mut sessions = MockSessionProvider::new();
    sessions.expect_end_session().times(1).return_const(());
    let mut navigator = MockNavigator::new();
    navigator.expect_to_sign_in().times(1).return_const(());
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().times(0);
    let cache = Arc::new(InMemoryQueryCache::new());
    cache
        .write(
            QueryKey::Company(CompanyId::from(1)),
            QueryData::Company(Some(company(1, "Acme", CompanyStatus::Won))),
        )
        .expect("seed detail");
    let coordinator = MutationCoordinator::with_presentation(
        CoordinatorPorts {
            gateway: Arc::new(MockCrmGateway::new()),
            cache: cache.clone(),
            sessions: Arc::new(sessions),
        },
        PresentationPorts {
            navigator: Arc::new(navigator),
            notifier: Arc::new(notifier),
        },
    );

    coordinator.sign_out().await;

    assert!(cache.keys().is_empty());
}

#[tokio::test]
async fn notices_follow_the_configured_locale() {
    let gateway = Arc::new(ScriptedGateway::new());
    let (coordinator, _cache, _navigator, notifier) = build(gateway.clone(), signed_in());
    let coordinator = coordinator.with_locale(NoticeLocale::PtBr);
    gateway
        .create_interaction
        .push_err(GatewayError::transport("offline"));
    let composer = InteractionComposer::new(CompanyId::from(1));
    composer.set_draft("Olá");

    let _ = coordinator.create_interaction(&composer).await;

    let notices = notifier.notices();
    let first = notices.first().expect("notice surfaced");
    assert_eq!(first.title, "Erro");
    assert_eq!(
        first.message,
        "Não foi possível enviar a interação. Tente novamente."
    );
}

#[tokio::test]
async fn fixture_gateway_drives_a_full_round_trip() {
    let (coordinator, _cache, _navigator, _notifier) =
        build(Arc::new(FixtureCrmGateway), signed_in());
    let detail = CompanyDetailState::new(company(1, "Acme", CompanyStatus::Lead));

    let outcome = coordinator
        .update_status(&detail, CompanyStatus::Lost)
        .await
        .expect("session active");

    assert!(outcome.is_reconciled());
    assert_eq!(detail.status(), CompanyStatus::Lost);
}

#[rstest]
#[case::transport(GatewayError::transport("x"), ErrorCode::ServiceUnavailable)]
#[case::timeout(GatewayError::timeout("x"), ErrorCode::ServiceUnavailable)]
#[case::unauthorized(GatewayError::unauthorized("x"), ErrorCode::Unauthorized)]
#[case::invalid(GatewayError::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case::rejected(GatewayError::rejected("x"), ErrorCode::InternalError)]
#[case::decode(GatewayError::decode("x"), ErrorCode::InternalError)]
fn gateway_errors_map_to_domain_codes(#[case] error: GatewayError, #[case] expected: ErrorCode) {
    assert_eq!(map_gateway_error(error).code(), expected);
}
