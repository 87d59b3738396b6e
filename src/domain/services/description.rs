#[cfg(test)]
#[path = "description_test.rs"]
mod tests;

use ratatui::prelude::Rect;

use crate::domain::models::Product;

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    return column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height);
}

/// Overlay showing a single product's description.
#[derive(Default)]
pub struct DescriptionViewer {
    product: Option<Product>,
}

impl DescriptionViewer {
    pub fn show(&mut self, product: Product) {
        tracing::debug!(id = product.id, "Showing description");
        self.product = Some(product);
    }

    pub fn hide(&mut self) {
        self.product = None;
    }

    pub fn current(&self) -> Option<&Product> {
        return self.product.as_ref();
    }

    pub fn is_open(&self) -> bool {
        return self.product.is_some();
    }

    /// Dismisses the overlay when the click lands on its background. Clicks on
    /// the content box keep it open. Returns true if the overlay consumed the
    /// click.
    pub fn handle_click(&mut self, column: u16, row: u16, overlay: Rect, content: Rect) -> bool {
        if !self.is_open() {
            return false;
        }

        if contains(content, column, row) {
            return true;
        }

        if contains(overlay, column, row) {
            self.hide();
        }

        return true;
    }
}
