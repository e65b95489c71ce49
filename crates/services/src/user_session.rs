use career_core::model::UserId;

/// The authenticated identity, passed explicitly to every operation that
/// reads or writes per-user state. Anonymous sessions persist nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSession {
    user: Option<UserId>,
}

impl UserSession {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    pub fn login(&mut self, user: UserId) {
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}
