//! Navigation chrome: routes, sidebar entries, breadcrumbs and the auth guard.

use uuid::Uuid;

use crate::session::Session;

pub const APP_TITLE: &str = "Leaply Admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Universities,
    /// Programs, optionally narrowed to one university.
    Programs { university_id: Option<Uuid> },
    Users,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Dashboard => "Dashboard",
            Self::Universities => "Universities",
            Self::Programs { .. } => "Programs",
            Self::Users => "User Management",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Universities => "/universities".to_string(),
            Self::Programs {
                university_id: Some(id),
            } => format!("/programs?universityId={id}"),
            Self::Programs { university_id: None } => "/programs".to_string(),
            Self::Users => "/users".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login)
    }

    /// `["Leaply Admin", <page>]`; the login screen has no breadcrumb.
    pub fn breadcrumb(&self) -> Vec<&'static str> {
        match self {
            Self::Login => Vec::new(),
            other => vec![APP_TITLE, other.title()],
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// A sidebar menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub route: Route,
}

pub fn sidebar() -> [NavItem; 4] {
    [
        NavItem {
            title: "Dashboard",
            route: Route::Dashboard,
        },
        NavItem {
            title: "Universities",
            route: Route::Universities,
        },
        NavItem {
            title: "Programs",
            route: Route::Programs { university_id: None },
        },
        NavItem {
            title: "Users",
            route: Route::Users,
        },
    ]
}

/// Whether `item` is highlighted while `current` is shown.
pub fn is_active(item: &NavItem, current: &Route) -> bool {
    std::mem::discriminant(&item.route) == std::mem::discriminant(current)
}

/// Redirect unauthenticated sessions to login, and authenticated ones away from it.
pub fn guard(route: Route, session: &Session) -> Route {
    match (route.requires_auth(), session.is_authenticated()) {
        (true, false) => Route::Login,
        (false, true) => Route::Dashboard,
        _ => route,
    }
}
