//! Bottom menu shared by the signed-in screens.

use crate::router::{Route, Router};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Add,
    Home,
    Profile,
}

impl MenuItem {
    pub const ALL: [Self; 3] = [Self::Add, Self::Home, Self::Profile];

    #[must_use]
    pub fn route(self) -> Route {
        match self {
            Self::Add => Route::Create,
            Self::Home => Route::Home,
            Self::Profile => Route::Profile,
        }
    }
}

#[derive(Debug, Default)]
pub struct Menu;

impl Menu {
    pub fn select(&self, item: MenuItem, router: &mut Router) {
        router.push(item.route());
    }
}
