use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    tidal,
    types::{AccountRole, PkceToken},
};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>, role: AccountRole) {
    tidal::auth::auth(shared_state, role).await;
}
