use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::conclusion::{CREDIT, OBSERVATIONS};
use crate::data::filter::{FIRST_MONTH, LAST_MONTH};
use crate::state::Dashboard;
use crate::ui::plot;
use crate::view::ViewMode;

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: view selector, then the three filters.
pub fn side_panel(ui: &mut Ui, dashboard: &mut Dashboard) {
    ui.heading("Navigation");
    ui.label("Select Analysis Type");
    let current = dashboard.view();
    for mode in ViewMode::ALL {
        if ui.radio(current == mode, mode.label()).clicked() {
            dashboard.set_view(mode);
        }
    }
    ui.separator();

    ui.heading("Filters");

    // Clone what we need so we can mutate the dashboard inside the loops.
    let categories = dashboard.raw().categories().to_vec();
    let payment_methods = dashboard.raw().payment_methods().to_vec();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multi_select(ui, "Filter by Category", &categories, |v| {
                dashboard.selection().categories.contains(v)
            })
            .apply(
                dashboard,
                Dashboard::toggle_category,
                Dashboard::select_all_categories,
                Dashboard::select_no_categories,
            );

            multi_select(ui, "Filter by Payment Method", &payment_methods, |v| {
                dashboard.selection().payment_methods.contains(v)
            })
            .apply(
                dashboard,
                Dashboard::toggle_payment_method,
                Dashboard::select_all_payment_methods,
                Dashboard::select_no_payment_methods,
            );

            ui.add_space(6.0);
            month_slider(ui, dashboard);
        });
}

/// What the user did to one multi-select during this frame.
#[derive(Default)]
struct MultiSelectAction {
    toggled: Vec<String>,
    all: bool,
    none: bool,
}

impl MultiSelectAction {
    fn apply(
        self,
        dashboard: &mut Dashboard,
        toggle: fn(&mut Dashboard, &str),
        select_all: fn(&mut Dashboard),
        select_none: fn(&mut Dashboard),
    ) {
        if self.all {
            select_all(dashboard);
        } else if self.none {
            select_none(dashboard);
        }
        for value in &self.toggled {
            toggle(dashboard, value);
        }
    }
}

/// Collapsible checkbox list with All/None buttons and a selected/total count.
fn multi_select(
    ui: &mut Ui,
    title: &str,
    values: &[String],
    is_selected: impl Fn(&str) -> bool,
) -> MultiSelectAction {
    let mut action = MultiSelectAction::default();
    let n_selected = values.iter().filter(|v| is_selected(v)).count();
    let header_text = format!("{title}  ({n_selected}/{})", values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    action.all = true;
                }
                if ui.small_button("None").clicked() {
                    action.none = true;
                }
            });

            for value in values {
                let mut checked = is_selected(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    action.toggled.push(value.clone());
                }
            }
        });
    action
}

/// Dual-handle month range built from two linked sliders.
fn month_slider(ui: &mut Ui, dashboard: &mut Dashboard) {
    ui.strong("Select Month Range");
    let months = dashboard.selection().months;
    let (mut lo, mut hi) = (months.lo(), months.hi());

    let lo_changed = ui
        .add(Slider::new(&mut lo, FIRST_MONTH..=LAST_MONTH).text("from"))
        .changed();
    let hi_changed = ui
        .add(Slider::new(&mut hi, FIRST_MONTH..=LAST_MONTH).text("to"))
        .changed();

    // the handle being dragged pushes the other one along
    if lo_changed && lo > hi {
        hi = lo;
    }
    if hi_changed && hi < lo {
        lo = hi;
    }
    if lo_changed || hi_changed {
        dashboard.set_month_range(lo, hi);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

pub fn top_bar(ui: &mut Ui, dashboard: &Dashboard) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("📊 Data Analysis Dashboard");
        ui.separator();
        ui.label(format!(
            "{} transactions loaded, {} after filters",
            dashboard.raw().len(),
            dashboard.filtered().len()
        ));
    });
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// The active view: a scrollable battery of charts, or the conclusion text.
pub fn central_panel(ui: &mut Ui, dashboard: &Dashboard) {
    let view = dashboard.view();
    ui.heading(RichText::new(view.heading()).size(24.0));
    ui.add_space(8.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if view == ViewMode::Conclusion {
                conclusion(ui);
            } else {
                for chart in dashboard.charts() {
                    plot::chart_card(ui, chart, &dashboard.series_colors);
                }
            }
            ui.separator();
            ui.strong(CREDIT);
        });
}

fn conclusion(ui: &mut Ui) {
    for (i, observation) in OBSERVATIONS.iter().enumerate() {
        ui.label(format!("{}. {}", i + 1, observation.finding));
        ui.indent(("observation", i), |ui: &mut Ui| {
            for detail in observation.details {
                ui.label(*detail);
            }
            for recommendation in observation.recommendations {
                ui.label(RichText::new(*recommendation).strong());
            }
        });
        ui.add_space(8.0);
    }
}

/// Startup-fatal error screen.
pub fn fatal_error(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!("Could not load the dataset.\n\n{message}"))
                .color(Color32::RED)
                .size(18.0),
        );
    });
}
