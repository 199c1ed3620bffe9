//! Printable plan export.

pub mod pdf;

use std::path::Path;

use crate::plan::{GeneratedPlan, MealSlot};

use pdf::{A4_WIDTH_MM, Font, PdfDocument, PdfError, Rgb, wrap_text};

pub const DEFAULT_FILE_NAME: &str = "mealwise-plan.pdf";

pub const TITLE: &str = "Mealwise Weekly Plan";

const MARGIN: f64 = 15.0;
const TOP: f64 = 20.0;
/// Lowest baseline allowed on a page.
pub const PAGE_BOTTOM: f64 = 287.0;
/// Vertical space one day occupies, rule to exercise line.
const DAY_BLOCK_HEIGHT: f64 = 65.0;
/// Wrapped paragraphs continue on a new page past this point.
const PARAGRAPH_BREAK_AT: f64 = 280.0;

const PURPLE: Rgb = Rgb(128, 0, 128);
const ORANGE: Rgb = Rgb(255, 102, 0);
const BODY: Rgb = Rgb(60, 60, 60);
const MUTED: Rgb = Rgb(100, 100, 100);
const RULE: Rgb = Rgb(200, 200, 200);

struct Layout {
    doc: PdfDocument,
    y: f64,
}

impl Layout {
    fn content_width() -> f64 {
        A4_WIDTH_MM - 2.0 * MARGIN
    }

    fn new_page(&mut self) {
        self.doc.add_page();
        self.y = TOP;
    }

    fn paragraph(&mut self, text: &str, size: f64, leading: f64) {
        for line in wrap_text(text, Self::content_width(), size) {
            if self.y > PARAGRAPH_BREAK_AT {
                self.new_page();
            }
            self.doc.text(MARGIN, self.y, size, Font::Regular, BODY, &line);
            self.y += leading;
        }
    }

    fn section(&mut self, heading: &str, body: &str) {
        if self.y > PARAGRAPH_BREAK_AT {
            self.new_page();
        }
        self.doc.text(MARGIN, self.y, 14.0, Font::Bold, ORANGE, heading);
        self.y += 7.0;
        self.paragraph(body, 10.0, 5.0);
        self.y += 10.0;
    }
}

/// Lay out `plan` as an A4 document.
pub fn render_plan_pdf(plan: &GeneratedPlan) -> Vec<u8> {
    let mut page = Layout {
        doc: PdfDocument::new(),
        y: TOP,
    };

    page.doc.text(MARGIN, page.y, 22.0, Font::Bold, PURPLE, TITLE);
    page.y += 10.0;
    page.paragraph(&plan.summary, 11.0, 6.0);
    page.y += 10.0;

    page.section("Nutritional Strategy", &plan.nutritional_strategy);
    page.section("Wellbeing Tips", &plan.side_effect_management);

    let right = A4_WIDTH_MM - MARGIN;
    for day in &plan.daily_plans {
        if page.y + DAY_BLOCK_HEIGHT > PAGE_BOTTOM {
            page.new_page();
        }

        page.doc.line(MARGIN, page.y, right, page.y, RULE);
        page.y += 10.0;

        page.doc.text(MARGIN, page.y, 16.0, Font::Bold, PURPLE, &day.day);
        page.doc.text(MARGIN + 60.0, page.y, 12.0, Font::Regular, MUTED, &day.theme);
        page.doc.text(
            right - 40.0,
            page.y,
            10.0,
            Font::Regular,
            Rgb(50, 50, 50),
            &format!("Total: {} kcal", day.total_calories),
        );
        page.y += 10.0;

        for slot in MealSlot::ALL {
            let meal = day.meal(slot);
            page.doc
                .text(MARGIN, page.y, 10.0, Font::Bold, Rgb::BLACK, &format!("{}:", slot.label()));
            page.doc.text(
                MARGIN + 20.0,
                page.y,
                10.0,
                Font::Regular,
                Rgb::BLACK,
                &format!("{} ({} kcal) - {}", meal.name, meal.calories, meal.protein),
            );
            page.y += 6.0;
        }

        page.y += 5.0;
        page.doc.text(
            MARGIN,
            page.y,
            10.0,
            Font::Regular,
            ORANGE,
            &format!("Hydration: {}", day.hydration_tip),
        );
        page.y += 6.0;
        page.doc.text(
            MARGIN,
            page.y,
            10.0,
            Font::Regular,
            ORANGE,
            &format!("Exercise: {}", day.exercise_suggestion),
        );
        page.y += 10.0;
    }

    tracing::debug!(
        days = plan.daily_plans.len(),
        pages = page.doc.page_count(),
        "plan document rendered"
    );
    page.doc.to_bytes()
}

/// Render `plan` and write it to `path`.
pub fn write_plan_pdf(plan: &GeneratedPlan, path: &Path) -> Result<(), PdfError> {
    let bytes = render_plan_pdf(plan);
    std::fs::write(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "plan exported");
    Ok(())
}

