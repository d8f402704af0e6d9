use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::format::{DisplayCell, DisplayTable};
use crate::state::{AppState, View};

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Listing table (central panel)
// ---------------------------------------------------------------------------

/// Render the central panel: title plus whatever the current view is.
pub fn listings_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Property Dashboard");
    ui.add_space(6.0);

    match state.view() {
        View::Error(msg) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(RichText::new(msg).color(Color32::RED).size(16.0));
            });
        }
        View::NoData => {
            ui.label(RichText::new("⚠️ No Land Found").color(Color32::YELLOW).size(16.0));
        }
        View::Listings(display) => listing_table(ui, display),
    }
}

/// Read-only table; the URL column renders as a link.
fn listing_table(ui: &mut Ui, display: &DisplayTable) {
    if display.is_empty() {
        ui.label("No listings match the current filters.");
        return;
    }

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(80.0), display.columns.len())
            .header(ROW_HEIGHT, |mut header| {
                for name in &display.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, display.rows.len(), |mut row| {
                    let cells = &display.rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| match cell {
                            DisplayCell::Text(text) => {
                                ui.label(text.as_str());
                            }
                            DisplayCell::Link { url, label } => {
                                ui.hyperlink_to(*label, url.as_str());
                            }
                        });
                    }
                });
            });
    });
}
