//! Behaviour shared by every store backend, exercised on `MemoryStore`.

use assert_matches::assert_matches;
use studio_core::automation::{plan_status_update, StatusChange};
use studio_core::finance::PaymentStatus;
use studio_core::roles::Role;
use studio_core::workflow::{CaptacaoStatus, EdicaoStatus, Phase, WorkflowStatus};
use studio_db::models::category::{CreateCategory, UpdateCategory};
use studio_db::models::client::{CreateClient, UpdateClient};
use studio_db::models::project::{CreateProject, ProjectFilter, UpdateProject};
use studio_db::models::user::{CreateUser, UpdateUser};
use studio_db::repositories::{CategoryRepo, ClientRepo, ProjectRepo, UserRepo};
use studio_db::{MemoryStore, Store, StoreError};

async fn client(store: &MemoryStore, email: &str) -> i64 {
    store
        .create_client(&CreateClient {
            name: "Cliente".into(),
            email: email.into(),
            ..CreateClient::default()
        })
        .await
        .unwrap()
        .id
}

async fn user(store: &MemoryStore, email: &str, role: Role) -> i64 {
    store
        .create_user(&CreateUser {
            name: "Colaborador".into(),
            email: email.into(),
            role,
            password_hash: "hash".into(),
        })
        .await
        .unwrap()
        .id
}

fn project_for(client_id: i64) -> CreateProject {
    CreateProject {
        title: "Casamento".into(),
        client_id,
        client_price: 1000.0,
        captation_cost: 300.0,
        edition_cost: 200.0,
        ..CreateProject::default()
    }
}

#[tokio::test]
async fn create_project_computes_margin_and_initial_status() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;

    let project = store.create_project(&project_for(client_id)).await.unwrap();

    assert_eq!(project.phase, Phase::Captacao);
    assert_eq!(project.status_captacao, Some(CaptacaoStatus::Agendado));
    assert_eq!(project.finance.margin, 500.0);
    assert_eq!(project.finance.payment_status, PaymentStatus::AFaturar);
}

#[tokio::test]
async fn create_project_requires_existing_client() {
    let store = MemoryStore::new();
    let err = store.create_project(&project_for(42)).await.unwrap_err();
    assert_matches!(err, StoreError::MissingReference { entity: "client", id: 42 });
}

#[tokio::test]
async fn update_recomputes_margin_from_kept_amounts() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let project = store.create_project(&project_for(client_id)).await.unwrap();

    let updated = store
        .update_project(
            project.id,
            &UpdateProject {
                client_price: Some(1500.0),
                ..UpdateProject::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.finance.margin, 1000.0);
}

#[tokio::test]
async fn update_of_missing_project_returns_none() {
    let store = MemoryStore::new();
    let result = store
        .update_project(7, &UpdateProject::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn status_change_is_applied_in_one_write() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let editor = user(&store, "ed@example.pt", Role::EditorEdicao).await;
    let project = store
        .create_project(&CreateProject {
            edition_only: true,
            ..project_for(client_id)
        })
        .await
        .unwrap();

    let plan = plan_status_update(
        &project.workflow_state(),
        WorkflowStatus::Edicao(EdicaoStatus::Decupagem),
        Some(editor),
    )
    .unwrap();
    let updated = store
        .apply_status_change(project.id, &project.workflow_state(), &plan.change)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status_edicao, Some(EdicaoStatus::Decupagem));
    assert_eq!(updated.responsavel_edicao_id, Some(editor));
    assert_eq!(updated.phase, Phase::Edicao);
}

#[tokio::test]
async fn status_change_rejects_unknown_responsible() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let project = store.create_project(&project_for(client_id)).await.unwrap();

    let change = StatusChange {
        responsavel_edicao_id: Some(99),
        ..StatusChange::default()
    };
    let err = store
        .apply_status_change(project.id, &project.workflow_state(), &change)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::MissingReference { entity: "user", .. });
}

#[tokio::test]
async fn status_change_planned_on_stale_snapshot_is_refused() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let mut project = store.create_project(&project_for(client_id)).await.unwrap();
    for next in [CaptacaoStatus::EmGravacao, CaptacaoStatus::UploadNas] {
        let plan = plan_status_update(
            &project.workflow_state(),
            WorkflowStatus::Captacao(next),
            None,
        )
        .unwrap();
        project = store
            .apply_status_change(project.id, &project.workflow_state(), &plan.change)
            .await
            .unwrap()
            .unwrap();
    }

    // Two requests read upload-nas and plan different legal moves.
    let snapshot = project.workflow_state();
    let finish =
        plan_status_update(&snapshot, WorkflowStatus::Captacao(CaptacaoStatus::Concluido), None)
            .unwrap();
    let reshoot =
        plan_status_update(&snapshot, WorkflowStatus::Captacao(CaptacaoStatus::EmGravacao), None)
            .unwrap();

    store
        .apply_status_change(project.id, &snapshot, &finish.change)
        .await
        .unwrap()
        .unwrap();
    let err = store
        .apply_status_change(project.id, &snapshot, &reshoot.change)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Stale { entity: "project", .. });

    let stored = store.find_project(project.id).await.unwrap().unwrap();
    assert_eq!(stored.phase, Phase::Edicao);
    assert_eq!(stored.status_captacao, Some(CaptacaoStatus::Concluido));
}

#[tokio::test]
async fn concurrent_self_assignment_keeps_first_editor() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let first = user(&store, "ed1@example.pt", Role::EditorEdicao).await;
    let second = user(&store, "ed2@example.pt", Role::EditorEdicao).await;
    let project = store
        .create_project(&CreateProject {
            edition_only: true,
            ..project_for(client_id)
        })
        .await
        .unwrap();
    let snapshot = project.workflow_state();
    let target = WorkflowStatus::Edicao(EdicaoStatus::Decupagem);

    let mine = plan_status_update(&snapshot, target, Some(first)).unwrap();
    let theirs = plan_status_update(&snapshot, target, Some(second)).unwrap();
    store
        .apply_status_change(project.id, &snapshot, &mine.change)
        .await
        .unwrap();
    let err = store
        .apply_status_change(project.id, &snapshot, &theirs.change)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Stale { .. });

    let stored = store.find_project(project.id).await.unwrap().unwrap();
    assert_eq!(stored.responsavel_edicao_id, Some(first));
}

#[tokio::test]
async fn payment_edit_does_not_invalidate_status_snapshot() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let project = store.create_project(&project_for(client_id)).await.unwrap();
    let snapshot = project.workflow_state();

    store
        .update_project(
            project.id,
            &UpdateProject {
                payment_status: Some(PaymentStatus::AReceber),
                ..UpdateProject::default()
            },
        )
        .await
        .unwrap();

    let plan =
        plan_status_update(&snapshot, WorkflowStatus::Captacao(CaptacaoStatus::EmGravacao), None)
            .unwrap();
    let updated = store
        .apply_status_change(project.id, &snapshot, &plan.change)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status_captacao, Some(CaptacaoStatus::EmGravacao));
    assert_eq!(updated.finance.payment_status, PaymentStatus::AReceber);
}

#[tokio::test]
async fn status_change_of_missing_project_returns_none() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let project = store.create_project(&project_for(client_id)).await.unwrap();
    let result = store
        .apply_status_change(99, &project.workflow_state(), &StatusChange::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn list_filters_and_orders_newest_first() {
    let store = MemoryStore::new();
    let first = client(&store, "a@example.pt").await;
    let second = client(&store, "b@example.pt").await;
    let p1 = store.create_project(&project_for(first)).await.unwrap();
    let p2 = store.create_project(&project_for(second)).await.unwrap();
    let p3 = store.create_project(&project_for(first)).await.unwrap();

    let all = store.list_projects(&ProjectFilter::default()).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![p3.id, p2.id, p1.id]);

    let filtered = store
        .list_projects(&ProjectFilter {
            client_id: Some(first),
            ..ProjectFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|p| p.client_id == first));
}

#[tokio::test]
async fn client_email_is_unique_ignoring_case() {
    let store = MemoryStore::new();
    client(&store, "ana@example.pt").await;
    let err = store
        .create_client(&CreateClient {
            name: "Outra Ana".into(),
            email: "ANA@example.pt".into(),
            ..CreateClient::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Duplicate { entity: "client", field: "email", .. });
}

#[tokio::test]
async fn email_uniqueness_folds_non_ascii_case() {
    let store = MemoryStore::new();
    client(&store, "élia@example.pt").await;
    let err = store
        .create_client(&CreateClient {
            name: "Élia".into(),
            email: "ÉLIA@example.pt".into(),
            ..CreateClient::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Duplicate { entity: "client", .. });

    user(&store, "joão@example.pt", Role::EditorEdicao).await;
    let err = store
        .create_user(&CreateUser {
            name: "João".into(),
            email: "JOÃO@example.pt".into(),
            role: Role::EditorEdicao,
            password_hash: "hash".into(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Duplicate { entity: "user", .. });
    assert!(store
        .find_user_by_email("JOÃO@EXAMPLE.PT")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn client_may_keep_its_own_email_on_update() {
    let store = MemoryStore::new();
    let id = client(&store, "ana@example.pt").await;
    let updated = store
        .update_client(
            id,
            &UpdateClient {
                email: Some("Ana@Example.pt".into()),
                phone: Some("912345678".into()),
                ..UpdateClient::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("912345678"));
}

#[tokio::test]
async fn client_with_projects_cannot_be_deleted() {
    let store = MemoryStore::new();
    let id = client(&store, "a@example.pt").await;
    store.create_project(&project_for(id)).await.unwrap();

    let err = store.delete_client(id).await.unwrap_err();
    assert_matches!(err, StoreError::InUse { entity: "client", projects: 1, .. });
    assert!(store.find_client(id).await.unwrap().is_some());
}

#[tokio::test]
async fn client_without_projects_is_deleted() {
    let store = MemoryStore::new();
    let id = client(&store, "a@example.pt").await;
    assert!(store.delete_client(id).await.unwrap());
    assert!(!store.delete_client(id).await.unwrap());
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let category = store
        .create_category(&CreateCategory {
            name: "Casamentos".into(),
            color: Some("#FFAA00".into()),
            ..CreateCategory::default()
        })
        .await
        .unwrap();
    store
        .create_project(&CreateProject {
            category_id: Some(category.id),
            ..project_for(client_id)
        })
        .await
        .unwrap();

    let err = store.delete_category(category.id).await.unwrap_err();
    assert_matches!(err, StoreError::InUse { entity: "category", .. });
}

#[tokio::test]
async fn category_rename_to_taken_name_fails() {
    let store = MemoryStore::new();
    store
        .create_category(&CreateCategory {
            name: "Eventos".into(),
            ..CreateCategory::default()
        })
        .await
        .unwrap();
    let other = store
        .create_category(&CreateCategory {
            name: "Corporate".into(),
            ..CreateCategory::default()
        })
        .await
        .unwrap();

    let err = store
        .update_category(
            other.id,
            &UpdateCategory {
                name: Some("eventos".into()),
                ..UpdateCategory::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Duplicate { entity: "category", .. });
}

#[tokio::test]
async fn responsible_user_cannot_be_deleted() {
    let store = MemoryStore::new();
    let client_id = client(&store, "a@example.pt").await;
    let shooter = user(&store, "foto@example.pt", Role::FreelancerCaptacao).await;
    store
        .create_project(&CreateProject {
            responsavel_captacao_id: Some(shooter),
            ..project_for(client_id)
        })
        .await
        .unwrap();

    let err = store.delete_user(shooter).await.unwrap_err();
    assert_matches!(err, StoreError::InUse { entity: "user", .. });
}

#[tokio::test]
async fn users_are_found_by_email_ignoring_case() {
    let store = MemoryStore::new();
    let id = user(&store, "Admin@Example.pt", Role::Admin).await;
    let found = store
        .find_user_by_email("admin@example.pt")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);
    assert!(found.is_active);

    let updated = store
        .update_user(
            id,
            &UpdateUser {
                is_active: Some(false),
                ..UpdateUser::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(!updated.is_active);
}

#[tokio::test]
async fn memory_backend_is_always_healthy() {
    let store = MemoryStore::new();
    assert_eq!(store.backend(), "memory");
    store.health_check().await.unwrap();
}
