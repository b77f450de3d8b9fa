//! API route table, relative to the configured base URL.

pub mod auth {
    pub const LOGIN: &str = "/auth/login/";
    pub const REGISTER: &str = "/auth/register/";
    pub const LOGOUT: &str = "/auth/logout/";
    pub const REFRESH: &str = "/auth/token/refresh/";
    pub const PASSWORD_RESET: &str = "/auth/password/reset/";
    pub const PASSWORD_CHANGE: &str = "/auth/password/change/";
    pub const PROFILE: &str = "/auth/user/profile/";
    pub const UPDATE_PROFILE: &str = "/auth/user/profile/update/";
}

pub mod questions {
    use std::fmt::Display;

    pub const LIST: &str = "/questions/";
    pub const POPULAR: &str = "/questions/popular/";
    pub const UNANSWERED: &str = "/questions/unanswered/";
    pub const FEATURED: &str = "/questions/featured/";
    pub const BOUNTY: &str = "/questions/bounty/";

    pub fn detail(id: impl Display) -> String {
        format!("/questions/{id}/")
    }

    /// Detail-scoped action such as `vote_up` or `close`.
    pub fn action(id: impl Display, action: &str) -> String {
        format!("/questions/{id}/{action}/")
    }
}

pub mod answers {
    use std::fmt::Display;

    pub const LIST: &str = "/answers/";
    pub const ACCEPTED: &str = "/answers/accepted/";
    pub const HIGHLY_VOTED: &str = "/answers/highly_voted/";

    pub fn detail(id: impl Display) -> String {
        format!("/answers/{id}/")
    }

    pub fn action(id: impl Display, action: &str) -> String {
        format!("/answers/{id}/{action}/")
    }
}

pub mod tags {
    use std::fmt::Display;

    pub const LIST: &str = "/tags/";

    pub fn detail(id: impl Display) -> String {
        format!("/tags/{id}/")
    }
}
