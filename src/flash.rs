use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::views::Notice;

const FLASH_COOKIE: &str = "liftlog_flash";

/// One-shot messages shown on the page after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    AccountCreated,
    WorkoutLogged,
}

impl Flash {
    fn code(self) -> &'static str {
        match self {
            Flash::AccountCreated => "account-created",
            Flash::WorkoutLogged => "workout-logged",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "account-created" => Some(Flash::AccountCreated),
            "workout-logged" => Some(Flash::WorkoutLogged),
            _ => None,
        }
    }

    pub fn notice(self) -> Notice {
        match self {
            Flash::AccountCreated => Notice::success("Account created! Please log in."),
            Flash::WorkoutLogged => Notice::success("Workout logged!"),
        }
    }
}

pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.code()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Reads and clears the pending flash, if any.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Notice>) {
    let Some(code) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, Vec::new());
    };
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    let notices = Flash::from_code(&code).map(Flash::notice).into_iter().collect();
    (jar, notices)
}
