#[cfg(test)]
#[path = "renderer_test.rs"]
mod tests;

use crate::domain::models::CategoryFilter;
use crate::domain::models::Product;
use crate::domain::models::ProductId;
use crate::domain::models::Role;
use crate::domain::models::SelectionSet;
use crate::domain::models::Transcript;

/// Width of the "(i)" description affordance at the right edge of a card.
pub const INFO_AFFORDANCE_WIDTH: u16 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductGridView {
    Placeholder(&'static str),
    Cards(Vec<ProductCard>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedItem {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectedListView {
    Placeholder(&'static str),
    Items(Vec<SelectedItem>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatLine {
    Author(Role),
    Text(String),
    Blank,
    Pending,
    Notice(String),
    Placeholder(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardClick {
    Toggle(ProductId),
    ShowDescription(ProductId),
}

pub struct Renderer {}

impl Renderer {
    pub fn product_grid(
        visible: &[Product],
        filter: &CategoryFilter,
        selection: &SelectionSet,
    ) -> ProductGridView {
        if *filter == CategoryFilter::None {
            return ProductGridView::Placeholder("Select a category to view products");
        }
        if visible.is_empty() {
            return ProductGridView::Placeholder("No products found in this category");
        }

        let cards = visible
            .iter()
            .map(|product| {
                return ProductCard {
                    id: product.id,
                    name: product.name.to_string(),
                    brand: product.brand.to_string(),
                    selected: selection.contains(product.id),
                };
            })
            .collect();

        return ProductGridView::Cards(cards);
    }

    pub fn selected_list(selection: &SelectionSet) -> SelectedListView {
        if selection.is_empty() {
            return SelectedListView::Placeholder("No products selected");
        }

        let items = selection
            .products()
            .iter()
            .map(|product| {
                return SelectedItem {
                    id: product.id,
                    name: product.name.to_string(),
                    brand: product.brand.to_string(),
                };
            })
            .collect();

        return SelectedListView::Items(items);
    }

    /// Lines for the chat window. A notice replaces the transcript entirely,
    /// the system turn is never shown, and the routine request is summarized
    /// rather than printing its JSON payload.
    pub fn chat(
        transcript: &Transcript,
        pending: bool,
        notice: Option<&str>,
        width: usize,
    ) -> Vec<ChatLine> {
        if let Some(text) = notice {
            return wrap_text(text, width)
                .into_iter()
                .map(ChatLine::Notice)
                .collect();
        }

        let mut lines = vec![];
        if transcript.is_empty() && !pending {
            lines.extend(
                wrap_text(
                    "Select products, then press g to generate a personalized routine.",
                    width,
                )
                .into_iter()
                .map(ChatLine::Placeholder),
            );
            return lines;
        }

        for (idx, turn) in transcript.turns().iter().enumerate() {
            if turn.role == Role::System {
                continue;
            }

            let mut text = turn.content.as_str();
            if idx == 1 && turn.role == Role::User {
                text = "Please generate a routine for my selected products.";
            }

            if !lines.is_empty() {
                lines.push(ChatLine::Blank);
            }
            lines.push(ChatLine::Author(turn.role));
            lines.extend(wrap_text(text, width).into_iter().map(ChatLine::Text));
        }

        if pending {
            if !lines.is_empty() {
                lines.push(ChatLine::Blank);
            }
            lines.push(ChatLine::Pending);
        }

        return lines;
    }

    /// Resolves a click inside a product card. The description affordance
    /// wins over selection, a click on it never toggles the product.
    pub fn card_click(id: ProductId, column: u16, card_width: u16) -> CardClick {
        if card_width > INFO_AFFORDANCE_WIDTH && column >= card_width - INFO_AFFORDANCE_WIDTH {
            return CardClick::ShowDescription(id);
        }

        return CardClick::Toggle(id);
    }
}

pub fn wrap_text(text: &str, line_max_width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let line_max_width = line_max_width.max(1);

    for full_line in text.replace('\t', "  ").split('\n') {
        if full_line.trim().is_empty() {
            lines.push("".to_string());
            continue;
        }

        let mut char_count = 0;
        let mut current_words: Vec<&str> = vec![];

        for word in full_line.split(' ') {
            let word_len = word.chars().count();
            if !current_words.is_empty() && word_len + char_count + 1 > line_max_width {
                lines.push(current_words.join(" ").trim_end().to_string());
                current_words = vec![word];
                char_count = word_len + 1;
            } else {
                current_words.push(word);
                char_count += word_len + 1;
            }
        }
        if !current_words.is_empty() {
            lines.push(current_words.join(" ").trim_end().to_string());
        }
    }

    return lines;
}
