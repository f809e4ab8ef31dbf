//! Scene setup capability: presentation state attached to the scene root.

use crate::document::schema::{BackgroundData, GridData, NavigationData, SetupData};

#[derive(Debug, Clone, Default)]
pub struct SetupComponent {
    pub background: Option<BackgroundData>,
    pub grid: Option<GridData>,
    pub navigation: Option<NavigationData>,
}

impl SetupComponent {
    pub fn from_data(data: &SetupData) -> Self {
        Self {
            background: data.background,
            grid: data.grid,
            navigation: data.navigation,
        }
    }

    pub fn to_data(&self) -> SetupData {
        SetupData {
            background: self.background,
            grid: self.grid,
            navigation: self.navigation,
        }
    }
}
