use anyhow::Result;
use domain::users::UserService;
use model::entities::user::Role;
use sea_orm::Database;
use tracing::{debug, error, info, trace};

/// Promotes an existing account to Admin, bypassing the verification queue.
pub async fn grant_admin(email: &str, database_url: &str) -> Result<()> {
    trace!("Entering grant_admin function");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url).await?;

    match UserService::new(&db).grant_role(email, Role::Admin).await {
        Ok(user) => {
            info!("{} ({}) is now an Admin", user.email, user.id);
            Ok(())
        }
        Err(e) => {
            error!("Failed to grant Admin to {}: {}", email, e);
            Err(e.into())
        }
    }
}
