// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin role assignment.
//!
//! An attendee is an admin exactly when their record holds a credential.

use crate::db::SharedStore;
use crate::error::AppError;
use crate::services::identity::IdentityProvider;
use std::sync::Arc;

#[derive(Clone)]
pub struct AdminRoleService {
    store: SharedStore,
    identity: Arc<dyn IdentityProvider>,
}

impl AdminRoleService {
    pub fn new(store: SharedStore, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Grant admin: issue a long-lived credential and store it on the user.
    pub async fn grant(&self, user_id: &str) -> Result<(), AppError> {
        if self.store.get_attendee(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Attendee {} not found", user_id)));
        }

        let credential = self.identity.issue_admin_credential(user_id).await?;
        self.store
            .set_admin_token(user_id, Some(&credential))
            .await?;

        tracing::info!(user_id, "Admin role granted");
        Ok(())
    }

    /// Revoke admin by deleting the stored credential.
    pub async fn revoke(&self, user_id: &str) -> Result<(), AppError> {
        self.store.set_admin_token(user_id, None).await?;
        tracing::info!(user_id, "Admin role revoked");
        Ok(())
    }
}
