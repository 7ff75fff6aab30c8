//! Prompt construction for the two detection modes
//!
//! The response contract embedded here ("I saw / I see / I say", dash
//! prefixes, exact item texts) is what `transcript::parse` and the exact
//! match mode in `checklist` rely on. Change them together or not at all.

use crate::checklist::Checklist;

/// History block fed to the model on the very first preparation observation
const FIRST_OBSERVATION: &str = "This is my first observation.";

/// History block fed to the model on the first cooking observation
const STARTING_RECIPE: &str = "Starting the recipe phase.";

/// Prompt for the ingredient-gathering phase
pub fn ingredient_prompt(ingredients: &Checklist) -> String {
    let required = ingredients
        .items()
        .iter()
        .map(|item| format!("- {}", item.text))
        .collect::<Vec<_>>()
        .join("\n");

    let seen = if ingredients.seen().is_empty() {
        FIRST_OBSERVATION.to_string()
    } else {
        ingredients.seen().as_prompt_block()
    };

    format!(
        "You are a friendly chef assistant helping someone gather ingredients for a cake.\n\
         \n\
         Required ingredients (EXACT format to use when listing ingredients):\n\
         {required}\n\
         \n\
         Previously seen ingredients:\n\
         {seen}\n\
         \n\
         IMPORTANT: Structure your response EXACTLY as follows and use the EXACT ingredient \
         names and quantities from the list above:\n\
         \n\
         I saw: [List ALL previously seen ingredients using their exact names from the list]\n\
         I see: [List ONLY the ingredients you can CURRENTLY see in the image, using their \
         exact names from the list. Each on a new line with a dash prefix]\n\
         I say: [Your friendly response about progress, please only mention the remaining \
         ingredients not in \"Previously seen ingredients:\"]\n\
         \n\
         CRITICAL RULES:\n\
         1. When listing ingredients in \"I see:\", use EXACTLY the same text as shown in \
         Required ingredients\n\
         2. Only list ingredients you are 100% certain about seeing in the current image. \
         Do not mention an ingredient if you are not sure.\n\
         3. You MUST only list your most confident ingredient in the current image.\n\
         4. Don't abbreviate or modify the ingredient names\n\
         \n\
         Current image analysis starting now."
    )
}

/// Prompt for the recipe-following phase
pub fn step_prompt(current_step: Option<&str>, next_step: Option<&str>, steps: &Checklist) -> String {
    let current = current_step.unwrap_or("All steps completed!");
    let next = next_step.unwrap_or("Recipe will be complete!");

    let completed = if steps.seen().is_empty() {
        STARTING_RECIPE.to_string()
    } else {
        steps.seen().as_prompt_block()
    };

    format!(
        "You are a friendly chef assistant helping someone follow a cake recipe.\n\
         \n\
         Current step to complete:\n\
         - {current}\n\
         \n\
         Next step will be:\n\
         - {next}\n\
         \n\
         Previously completed steps:\n\
         {completed}\n\
         \n\
         IMPORTANT: Structure your response EXACTLY as follows and use the EXACT step \
         descriptions:\n\
         \n\
         I saw: [List ALL previously completed steps using their exact descriptions, each \
         on a new line with a dash prefix]\n\
         I see: [Describe ONLY the current cooking action you observe, using EXACT match \
         to the step description if you see it being performed]\n\
         I say: [Your friendly response about progress]\n\
         \n\
         CRITICAL RULES:\n\
         1. When listing steps in \"I saw:\" and \"I see:\", use EXACTLY the same text as \
         shown in the step descriptions\n\
         2. Only list a step in \"I see:\" if you are 100% certain the action is being \
         performed right now\n\
         3. Each step must start with \"- \" and be on a new line\n\
         4. Don't abbreviate or modify the step descriptions\n\
         5. Only mark a step as seen if ALL parts of the step are being performed \
         (e.g., correct ingredients and actions)\n\
         \n\
         Current image analysis starting now."
    )
}

/// Prompt for rating the finished dish
pub fn aesthetics_prompt() -> String {
    "You are an expert in food presentation aesthetics.\n\
     \n\
     Analyze the provided image of a completed recipe and rate its visual appeal on a \
     scale of 1 to 5 based on:\n\
     - Color balance and plating aesthetics\n\
     - Overall presentation neatness\n\
     - Professional appearance\n\
     \n\
     Strictly return the result in the following JSON format:\n\
     {\"score\": X}\n\
     where X is an integer between 1 and 5."
        .to_string()
}
