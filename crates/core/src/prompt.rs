//! Instruction composition for generation calls.
//!
//! Each page's instruction is assembled from its outline content, the
//! deck's shared style configuration, and any user supplement.  Title
//! pages use a distinct, simpler template.

use crate::deck::StyleConfig;
use crate::page::Page;

/// Compose the instruction text for one page's generation call.
pub fn compose_page_instruction(page: &Page, style: &StyleConfig) -> String {
    if page.is_title {
        return compose_title_instruction(page, style);
    }

    let mut out = String::new();
    out.push_str(
        "Design a presentation slide image matching the provided reference style.\n",
    );
    out.push_str(&format!("Slide heading: {}\n", page.heading));

    if !page.points.is_empty() {
        out.push_str("Key points to show on the slide:\n");
        for point in &page.points {
            out.push_str(&format!("- {point}\n"));
        }
    }

    if let Some(desc) = &page.image_desc {
        out.push_str(&format!("Visual direction: {desc}\n"));
    }

    if !page.script.is_empty() {
        out.push_str(&format!(
            "Context from the speaker notes (do not render verbatim): {}\n",
            page.script
        ));
    }

    if let Some(supplement) = &page.supplement {
        if !supplement.text.is_empty() {
            out.push_str(&format!("Additional instructions: {}\n", supplement.text));
        }
        if !supplement.images.is_empty() {
            out.push_str(
                "Use the extra attached images as supplementary visual references.\n",
            );
        }
    }

    push_style(&mut out, style);
    out
}

/// Title pages get a simpler template: just the deck-opening heading and
/// the shared style.
fn compose_title_instruction(page: &Page, style: &StyleConfig) -> String {
    let mut out = String::new();
    out.push_str(
        "Design the title slide of a presentation, matching the provided reference style.\n",
    );
    out.push_str(&format!("Presentation title: {}\n", page.heading));
    if let Some(desc) = &page.image_desc {
        out.push_str(&format!("Visual direction: {desc}\n"));
    }
    push_style(&mut out, style);
    out
}

fn push_style(out: &mut String, style: &StyleConfig) {
    if let Some(style_prompt) = &style.style_prompt {
        out.push_str(&format!("Overall style: {style_prompt}\n"));
    }
    out.push_str(&format!(
        "Render a single clean slide image, {} aspect ratio, with legible text.",
        style.aspect_ratio
    ));
}

/// Compose the outline-synthesis prompt sent to the LLM endpoint.
///
/// The response contract matches [`crate::outline::parse_outline`]: a JSON
/// array of entries with `page_number`, `heading`, `points`, `image_desc`,
/// `script`, and `is_title` fields.
pub fn compose_outline_prompt(topic: &str, page_count: u32) -> String {
    format!(
        "You are preparing a presentation outline.\n\
         Topic: {topic}\n\
         Produce exactly {page_count} slides as a JSON array. Each element must \
         have the fields: page_number (1-based integer), heading (string), \
         points (array of short strings), image_desc (string describing the \
         slide visual), script (spoken notes for the presenter), and is_title \
         (boolean, true only for slide 1).\n\
         Slide 1 is the title slide. Respond with JSON only."
    )
}
