//! Resolution of a project's related entities for responses.

use std::collections::HashMap;

use studio_core::types::DbId;
use studio_db::models::project::{Project, ProjectRelations, ProjectView, RelatedEntity};
use studio_db::Store;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// Id-to-name lookup tables for every entity a project can reference.
///
/// Loaded once per list request so building N views costs three store
/// calls instead of 4N.
#[derive(Debug, Default)]
pub struct RelationIndex {
    clients: HashMap<DbId, String>,
    categories: HashMap<DbId, String>,
    users: HashMap<DbId, String>,
}

impl RelationIndex {
    pub async fn load(store: &dyn Store) -> AppResult<Self> {
        let clients = store.list_clients().await?;
        let categories = store.list_categories().await?;
        let users = store.list_users().await?;
        Ok(Self {
            clients: clients.into_iter().map(|c| (c.id, c.name)).collect(),
            categories: categories.into_iter().map(|c| (c.id, c.name)).collect(),
            users: users.into_iter().map(|u| (u.id, u.name)).collect(),
        })
    }

    pub fn relations_for(&self, project: &Project) -> ProjectRelations {
        let lookup = |table: &HashMap<DbId, String>, id: Option<DbId>| {
            id.and_then(|id| {
                table.get(&id).map(|name| RelatedEntity {
                    id,
                    name: name.clone(),
                })
            })
        };
        ProjectRelations {
            client: lookup(&self.clients, Some(project.client_id)),
            category: lookup(&self.categories, project.category_id),
            responsavel_captacao: lookup(&self.users, project.responsavel_captacao_id),
            responsavel_edicao: lookup(&self.users, project.responsavel_edicao_id),
        }
    }

    pub fn view(&self, project: Project, viewer: &AuthUser) -> ProjectView {
        let relations = self.relations_for(&project);
        ProjectView::for_viewer(project, viewer.role, viewer.user_id, relations)
    }
}

/// Look up the related entities of a single project.
pub async fn resolve_relations(store: &dyn Store, project: &Project) -> AppResult<ProjectRelations> {
    let client = store
        .find_client(project.client_id)
        .await?
        .map(|c| RelatedEntity { id: c.id, name: c.name });

    let category = match project.category_id {
        Some(id) => store
            .find_category(id)
            .await?
            .map(|c| RelatedEntity { id: c.id, name: c.name }),
        None => None,
    };

    let mut users = [None, None];
    for (slot, id) in users.iter_mut().zip([
        project.responsavel_captacao_id,
        project.responsavel_edicao_id,
    ]) {
        if let Some(id) = id {
            *slot = store
                .find_user(id)
                .await?
                .map(|u| RelatedEntity { id: u.id, name: u.name });
        }
    }
    let [responsavel_captacao, responsavel_edicao] = users;

    Ok(ProjectRelations {
        client,
        category,
        responsavel_captacao,
        responsavel_edicao,
    })
}

/// Build the sanitized view of one project for `viewer`.
pub async fn project_view(
    store: &dyn Store,
    project: Project,
    viewer: &AuthUser,
) -> AppResult<ProjectView> {
    let relations = resolve_relations(store, &project).await?;
    Ok(ProjectView::for_viewer(
        project,
        viewer.role,
        viewer.user_id,
        relations,
    ))
}
