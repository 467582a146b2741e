//! Pitch-deck prompts: clarifying questions, outline, and the final deck brief.

use deckgen_shared::{CompanyProfile, PromptContext};

/// Characters of the meta description used as the fallback tagline.
const TAGLINE_CHARS: usize = 50;

/// Ask the model for exactly three clarifying questions about the company.
pub fn questions_prompt(profile: &CompanyProfile) -> String {
    format!(
        "\nBased on this company information, generate exactly 3 relevant questions to ask the \
         user to better understand their business for creating a pitch deck:\n\
         \n\
         Company URL: {url}\n\
         Company Title: {title}\n\
         Company Description: {description}\n\
         H1: {h1}\n\
         First Paragraph: {first_paragraph}\n\
         \n\
         Generate 3 specific, relevant questions that will help create a compelling pitch deck.\n\
         Focus on understanding their business model, target market, unique value proposition, \
         and growth plans.\n\
         \n\
         The questions should be clear, specific, and designed to gather essential information \
         for creating a professional pitch deck.\n",
        url = profile.url,
        title = profile.title,
        description = profile.description,
        h1 = profile.h1,
        first_paragraph = profile.first_paragraph,
    )
}

/// `Q:`/`A:` blocks separated by blank lines.
pub fn render_qa(context: &PromptContext) -> String {
    context
        .qa
        .iter()
        .map(|pair| format!("Q: {}\nA: {}\n", pair.question, pair.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ask the model for a markdown slide outline informed by the operator's answers.
pub fn outline_prompt(context: &PromptContext) -> String {
    let profile = &context.profile;
    format!(
        "\nCreate a comprehensive pitch deck structure in markdown format for this company:\n\
         \n\
         Company Information:\n\
         - URL: {url}\n\
         - Title: {title}\n\
         - Description: {description}\n\
         - H1: {h1}\n\
         \n\
         Questions Asked and User Answers:\n\
         {qa}\n\
         \n\
         Generate a pitch deck structure with 8-12 slides covering:\n\
         1. Title slide with company name and tagline\n\
         2. Problem statement\n\
         3. Solution overview\n\
         4. Market opportunity\n\
         5. Business model\n\
         6. Competitive advantage\n\
         7. Go-to-market strategy\n\
         8. Financial projections\n\
         9. Team\n\
         10. Funding ask (if applicable)\n\
         11. Contact information\n\
         \n\
         Use the questions and answers provided to create a more targeted and relevant pitch \
         deck structure.\n\
         Format as markdown with clear slide titles and bullet points for content.\n",
        url = profile.url,
        title = profile.title,
        description = profile.description,
        h1 = profile.h1,
        qa = render_qa(context),
    )
}

/// Static outline used when the model cannot produce one.
pub fn default_outline(profile: &CompanyProfile) -> String {
    let tagline: String = profile.description.chars().take(TAGLINE_CHARS).collect();
    let todo = "- [To be filled based on user input]";
    format!(
        "\n# {title} - Pitch Deck\n\
         \n\
         ## Slide 1: Title Slide\n\
         - Company Name: {title}\n\
         - Tagline: {tagline}...\n\
         \n\
         ## Slide 2: Problem Statement\n{todo}\n\
         \n\
         ## Slide 3: Our Solution\n{todo}\n\
         \n\
         ## Slide 4: Market Opportunity\n{todo}\n\
         \n\
         ## Slide 5: Business Model\n{todo}\n\
         \n\
         ## Slide 6: Competitive Advantage\n{todo}\n\
         \n\
         ## Slide 7: Go-to-Market Strategy\n{todo}\n\
         \n\
         ## Slide 8: Financial Projections\n{todo}\n\
         \n\
         ## Slide 9: Team\n{todo}\n\
         \n\
         ## Slide 10: Funding Ask\n{todo}\n\
         \n\
         ## Slide 11: Contact Information\n\
         - Website: {url}\n\
         - [Additional contact details]\n",
        title = profile.title,
        url = profile.url,
    )
}

/// Final brief sent to the presentation service.
pub fn pitch_prompt(profile: &CompanyProfile, outline: &str, n_slides: u32) -> String {
    format!(
        "\nCreate a professional pitch deck for {title}.\n\
         \n\
         Company Information:\n\
         - Website: {url}\n\
         - Description: {description}\n\
         \n\
         Pitch Deck Structure:\n\
         {outline}\n\
         \n\
         Create a compelling pitch deck with professional slides, clear messaging, and engaging \
         visuals.\n\
         Focus on storytelling and making the business case compelling.\n\
         Target {n_slides} slides.\n",
        title = profile.title,
        url = profile.url,
        description = profile.description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CompanyProfile {
        CompanyProfile {
            url: "https://acme.test".into(),
            title: "Acme Rockets".into(),
            description: "Reusable rockets for small payloads, launched weekly from three sites."
                .into(),
            h1: "We build rockets".into(),
            first_paragraph: "Founded in 2019.".into(),
        }
    }

    #[test]
    fn questions_prompt_includes_fields() {
        let p = questions_prompt(&profile());
        assert!(p.contains("generate exactly 3 relevant questions to ask the user"));
        assert!(p.contains("Company URL: https://acme.test\n"));
        assert!(p.contains("First Paragraph: Founded in 2019.\n"));
    }

    #[test]
    fn qa_blocks_in_order() {
        let ctx = PromptContext::new(profile(), ["Who buys?", "Why now?"], ["Labs", ""]);
        assert_eq!(render_qa(&ctx), "Q: Who buys?\nA: Labs\n\nQ: Why now?\nA: \n");
    }

    #[test]
    fn outline_prompt_embeds_answers() {
        let ctx = PromptContext::new(profile(), ["Who buys?"], ["Research labs"]);
        let p = outline_prompt(&ctx);
        assert!(p.contains("Questions Asked and User Answers:\nQ: Who buys?\nA: Research labs\n\n"));
        assert!(p.contains("- H1: We build rockets\n"));
        assert!(p.contains("10. Funding ask (if applicable)\n"));
    }

    #[test]
    fn default_outline_truncates_tagline() {
        let outline = default_outline(&profile());
        assert!(outline.starts_with("\n# Acme Rockets - Pitch Deck\n"));
        assert!(outline.contains("- Tagline: Reusable rockets for small payloads, launched week...\n"));
        assert!(outline.contains("## Slide 11: Contact Information\n- Website: https://acme.test\n"));
        assert_eq!(outline.matches("[To be filled based on user input]").count(), 9);
    }

    #[test]
    fn pitch_prompt_wraps_outline() {
        let p = pitch_prompt(&profile(), "# Outline", 10);
        assert!(p.starts_with("\nCreate a professional pitch deck for Acme Rockets.\n"));
        assert!(p.contains("Pitch Deck Structure:\n# Outline\n\n"));
        assert!(p.ends_with("Target 10 slides.\n"));
    }
}
