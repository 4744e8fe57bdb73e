//! Prompt composition for every coaching mode.
//!
//! Each template receives the caller's free-form context plus the rendered
//! memory block and returns the full prompt text. Context fields that a
//! template relies on fall back to neutral defaults when absent.

use chrono::Utc;
use serde_json::Value;

use crate::mode::Mode;

/// Compose the prompt for `mode`
pub fn compose(mode: Mode, message: Option<&str>, context: Option<&Value>, memory: &str) -> String {
    match mode {
        Mode::Chat => chat_prompt(context, memory),
        Mode::Title => title_prompt(message),
        Mode::GenerateSummary => summary_prompt(context),
        Mode::GoalIntake => goal_intake_prompt(context, memory),
        Mode::Plan => plan_prompt(context, memory),
        Mode::ValidateGoal => validate_goal_prompt(message, context),
        Mode::GenerateRoadmap => roadmap_prompt(context),
        Mode::GenerateDailyTasks => daily_tasks_prompt(context),
        Mode::AnalyzeMeal => analyze_meal_prompt(message),
        Mode::MealSuggest => meal_suggest_prompt(message, context, memory),
        Mode::IngredientSuggest => ingredient_suggest_prompt(message, context, memory),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context helpers
// ─────────────────────────────────────────────────────────────────────────────

/// The whole context as compact JSON, `{}` when absent
fn context_json(context: Option<&Value>) -> String {
    context
        .map(Value::to_string)
        .unwrap_or_else(|| "{}".to_string())
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn ctx_field<'a>(context: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    match context?.get(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

/// Field rendered as template text, with a fallback for missing or empty
/// values
fn ctx_or(context: Option<&Value>, key: &str, default: &str) -> String {
    match ctx_field(context, key) {
        Some(Value::String(s)) if s.is_empty() => default.to_string(),
        Some(value) => render_value(value),
        None => default.to_string(),
    }
}

/// Field rendered as template text; `unknown` when absent
fn ctx_raw(context: Option<&Value>, key: &str) -> String {
    ctx_or(context, key, "unknown")
}

// ─────────────────────────────────────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────────────────────────────────────

fn chat_prompt(context: Option<&Value>, memory: &str) -> String {
    let context = context_json(context);
    format!(
        r#"You are VitalQuest, an AI Health Coach.
User Context: {context}
Refer to the user by their first name.
If the context says 'User' but the Retrieved Memories below contain a name (e.g., "My name is Rejith"), USE THE NAME FROM MEMORIES.

MEMORY HANDLING RULES:
- The "Retrieved Memories" below may contain conflicting info (e.g. "Weight 86kg" and "Weight 87kg").
- Use the timestamps provided (if any) to determine the LATEST status.
- When answering, prioritize the LATEST information.
- If helpful, mention the history (e.g. "I see your weight has changed from 86kg to 87kg...").

{memory}

**CRITICAL TOPIC BOUNDARY:**
- You are a SPECIALIZED Health & Fitness Agent.
- You MUST **REFUSE** to answer questions unrelated to health, diet, fitness, mental well-being, or the VitalQuest app.
- If asked about coding (e.g. "write a python script"), math, politics, or general knowledge, politely decline: "I am your specific Health AI coach. I can only help with health and fitness queries."

Keep responses helpful, encouraging, and thorough (within the health domain). Provide detailed explanations when the user asks for advice or plans."#
    )
}

fn title_prompt(message: Option<&str>) -> String {
    let message = message.unwrap_or_default();
    format!(
        r#"Generate a very short title (3-5 words max) for a chat conversation that starts with this message: "{message}".
Return ONLY the title text, no quotes, no punctuation at the end.
Examples: "Morning Workout Plan", "Diet Tips Question", "Weight Loss Goals""#
    )
}

fn summary_prompt(context: Option<&Value>) -> String {
    let name = ctx_or(context, "userName", "Friend");
    let hour = ctx_raw(context, "hour");
    let hydration = ctx_field(context, "hydration");
    let current = hydration
        .and_then(|h| h.get("current"))
        .map(render_value)
        .unwrap_or_else(|| "0".to_string());
    let target = hydration
        .and_then(|h| h.get("target"))
        .map(render_value)
        .unwrap_or_else(|| "2000".to_string());
    let tasks = ctx_field(context, "tasks")
        .map(Value::to_string)
        .unwrap_or_else(|| "null".to_string());

    format!(
        r#"You are VitalQuest, an enthusiastic AI Health Coach.
User Name: {name}
Current Time Hour: {hour}
Hydration: {current} / {target} ml
Today's Tasks Summary: {tasks}

Task: Analyze the user's progress for today.

Generate a concise, high-energy status update (30-40 words MAX).

Structure:
1. Personalized Greeting.
2. Progress acknowledgement (tasks & water).
   - If water is low (below 50% by afternoon), remind them to drink!
   - If water is good, celebrate it.
3. Motivation for the NEXT specific task.

Tone: Encouraging, energetic, like a personal trainer.
Output: ONLY the plain text message. No markdown headers."#
    )
}

fn goal_intake_prompt(context: Option<&Value>, memory: &str) -> String {
    let context = context_json(context);
    let today = Utc::now().format("%Y-%m-%d");
    format!(
        r#"You are VitalQuest, an AI Health Coach. Your ONLY job is to collect the 7 required pieces of information below, then output JSON. DO NOT provide plans, advice, or long explanations during this phase.

USER CONTEXT: {context}

MEMORY BANK (Past Conversations):
{memory}

REQUIRED INFORMATION (Collect these 7 items):
1. Main Goal (e.g., "Lose weight", "Build muscle")
2. Current Weight (in kg)
3. Target Weight (in kg)
4. Timeline (e.g., 8 weeks)
5. Start Date (When they want to start - e.g., "Tomorrow", "Next Monday", "Jan 25", or a specific date. Default to tomorrow if user says "immediately" or "now")
6. Dietary Preference (e.g., Vegetarian, Non-Veg, Vegan, Keto)
7. Regional Preference (e.g., North Indian, South Indian, Mediterranean)

CONVERSATION FLOW:
1. **Gather Items:** Check MEMORY BANK or context for any known info. Ask for missing items one by one. Keep responses SHORT (1-2 sentences).
2. **Detailed Summary:** ONCE ALL 7 ITEMS ARE COLLECTED, provide a DETAILED summary of the proposed plan. THIS SUMMARY MUST BE 50-70 WORDS LONG. Cover the nutrition strategy, regional food integration, start date, and expected progress.
3. **Wait for Lock:** At the end of the summary, ask: "Does this roadmap look good? Ready to lock it in and generate your plan?"
4. **Final Turn (JSON):** ONLY AFTER the user gives a positive confirmation (e.g., "Confirm", "Lock it in"), output the JSON below. DO NOT say anything else. Just the JSON.

CRITICAL RULES:
- DO NOT provide JSON until AFTER the user confirms the detailed 50-70 word summary.
- If the user hasn't confirmed the summary, persist in plain text.
- For Start Date: Convert ALL relative dates (like "tomorrow", "next Monday", "Feb 1st", "this coming friday") into a strict YYYY-MM-DD format using today's date: {today} as the reference. This is critical.
- The "start_date" MUST be a valid YYYY-MM-DD string in the JSON output and should never be missing or null.

OUTPUT FORMAT:
- Summary/Interaction: Plain text.
- Final Confirmation:
  {{
    "status": "complete",
    "data": {{
      "goal": "lose_weight or build_muscle",
      "weight": number,
      "target_weight": number,
      "duration_weeks": number,
      "start_date": "YYYY-MM-DD",
      "diet": "string",
      "region": "string"
    }},
    "summary": "The LATEST detailed 50-70 word summary you just provided."
  }}"#
    )
}

fn plan_prompt(context: Option<&Value>, memory: &str) -> String {
    let context = context_json(context);
    format!(
        r#"You are VitalQuest. Generate a personalized daily health plan for the user.
User Context: {context}
{memory}

Return ONLY a valid JSON object (no markdown, no backticks) with this structure:
{{
  "summary": "Brief encouraging summary of the day's focus (max 1 sentence)",
  "tasks": [
    {{ "description": "Short task description", "xp_reward": 10, "task_type": "workout" }},
    {{ "description": "Short task description", "xp_reward": 10, "task_type": "nutrition" }},
    {{ "description": "Short task description", "xp_reward": 10, "task_type": "mindfulness" }}
  ]
}}
Generate exactly 3 tasks tailored to the user's level."#
    )
}

fn validate_goal_prompt(message: Option<&str>, context: Option<&Value>) -> String {
    // The goal may arrive in context or as the raw message
    let request = match ctx_field(context, "goalDescription") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(value) => render_value(value),
        None => message.unwrap_or("unknown").to_string(),
    };
    let weight = ctx_raw(context, "weight");
    let target_value = ctx_raw(context, "targetValue");
    let target_unit = ctx_raw(context, "targetUnit");
    let duration = ctx_raw(context, "durationWeeks");

    format!(
        r#"TASK: Validate if the user's health goal is realistic and safe.

USER REQUEST: {request}
CURRENT WEIGHT: {weight} kg
TARGET: {target_value} {target_unit}
TIMELINE: {duration} weeks

SAFETY RULES:
- Weight loss: Max 1kg per week (0.5-0.75kg is ideal).
- Weight gain: Max 0.5kg per week.
- Minimum timeline: 2 weeks.

Output JSON object ONLY:
{{
  "is_realistic": true/false,
  "reason": "Clear explanation to the user",
  "suggested_timeline_weeks": number (safe duration if unrealistic, else null),
  "rate_per_week": number
}}"#
    )
}

fn roadmap_prompt(context: Option<&Value>) -> String {
    let goal = ctx_or(context, "goal", "lose_weight");
    let weight = ctx_raw(context, "weight");
    let target_weight = ctx_raw(context, "target_weight");
    let duration = ctx_raw(context, "duration_weeks");
    let diet = ctx_or(context, "diet", "Balanced");
    let region = ctx_or(context, "region", "Indian");

    format!(
        r#"Generate a High-Level Roadmap and Day 1 Plan.

USER CONTEXT:
- Goal: {goal}
- Current Weight: {weight} kg
- Target Weight: {target_weight} kg
- Duration: {duration} weeks
- Diet: {diet}
- Region: {region}

OUTPUT FORMAT (JSON ONLY):
{{
  "goal_summary": "Thorough 50-70 word summary of the strategy",
  "daily_calorie_target": number,
  "daily_water_target": number,
  "macros": {{ "protein": number, "carbs": number, "fat": number }},
  "weekly_plans": [
     {{ "week": 1, "focus": "...", "calorie_target": number, "ai_tips": "Reflect {diet} and {region} style tips" }}
      ... (for all {duration} weeks)
  ],
  "day_1_tasks": {{
    "meals": [
       {{ "meal_type": "breakfast", "time": "08:00", "description": "Specific {region} {diet} dish", "calories": number, "protein": num, "carbs": num, "fat": num }},
       ...
    ],
    ...
  }}
}}

RULES:
1. Respect {diet} and {region} preferences strictly.
2. Generate a 'weekly_plan' item for EVERY week in the duration ({duration} weeks).
3. Generate detailed 'day_1_tasks' ONLY for Day 1.
4. Output valid JSON only. No markdown, no backticks.
5. Calculate appropriate calorie deficit for safe weight loss (0.5-1kg/week).
6. **GOAL ALIGNMENT (STRICT)**: Day 1 meals MUST strictly align with the Goal ({goal}).
   - Weight Loss: Prioritize steamed, grilled, or dry preparations. **AVOID** rich/creamy gravies. High protein, high fiber.
   - Weight Gain: Calorie dense.
7. **MANDATORY FIELDS**: EVERY Day 1 meal MUST have 'calories' (number, not null) and 'time'.
8. **WATER TARGET**: Calculate daily water needs based on weight (approx 35ml per kg of body weight). Min 2000ml. Max 4000ml."#
    )
}

fn daily_tasks_prompt(context: Option<&Value>) -> String {
    let day = ctx_or(context, "dayNumber", "?");
    let week = ctx_or(context, "weekNumber", "?");
    let goal = ctx_raw(context, "goalDescription");
    let focus = ctx_raw(context, "weekFocus");
    let calories = ctx_raw(context, "calorieTarget");
    let diet = ctx_raw(context, "dietPreference");

    format!(
        r#"Generate daily tasks for Day {day} of Week {week}.

CONTEXT:
- Goal: {goal}
- Week Focus: {focus}
- Calorie Target: {calories}
- Diet: {diet}

OUTPUT JSON ONLY (Strict Schema):
{{
  "meals": [
    {{ "meal_type": "breakfast", "time": "08:00", "description": "Specific meal description", "calories": number, "protein": number, "carbs": number, "fat": number }},
    {{ "meal_type": "lunch", "time": "13:00", "description": "...", "calories": number, ... }},
    {{ "meal_type": "dinner", "time": "19:00", "description": "...", "calories": number, ... }},
    {{ "meal_type": "snack", "time": "16:00", "description": "...", "calories": number, ... }}
  ],
  "workouts": [
    {{ "time": "18:00", "description": "Specific workout details", "duration": "30 min", "calories_burned": number }}
  ]
}}

Rules:
 1. **GOAL ALIGNMENT (STRICT)**: All meals MUST strictly align with the Goal ({goal}).
    - **Weight Loss**: Prioritize steamed, grilled, or dry preparations. **AVOID** rich/creamy gravies, heavy coconut milk, or fried foods. High protein, high fiber.
    - Weight Gain: Calorie dense, high protein, healthy fats.
    - Maintenance: Balanced macronutrients.
 2. Ensure EVERY meal has a 'time', 'calories', and 'description'.
 3. Ensure total calories sum up close to the target ({calories}).
 4. Return valid JSON only."#
    )
}

fn analyze_meal_prompt(message: Option<&str>) -> String {
    let description = match message {
        Some(m) if !m.is_empty() => m,
        _ => "See image",
    };

    format!(
        r#"Analyze the food in this image and estimate nutritional content.

IMPORTANT: Describe what you ACTUALLY SEE in the image, not what was planned.
If the image shows rice with curry, say "rice with curry" not what the planned meal was.

Context (for reference only):
- User Description: {description}

Respond with JSON ONLY:
{{
  "detected_food": "Describe exactly what you see in the image",
  "calories": number,
  "protein": number,
  "carbs": number,
  "fat": number,
  "confidence": "high" | "medium" | "low",
  "notes": "Brief nutritional analysis of what you detected"
}}"#
    )
}

fn meal_suggest_prompt(message: Option<&str>, context: Option<&Value>, memory: &str) -> String {
    let request = message.unwrap_or("N/A");
    let planned = ctx_or(context, "plannedMeal", "N/A");
    let meal_type = ctx_or(context, "mealType", "N/A");
    let goal = ctx_or(context, "goalDescription", "General Health");
    let calories = ctx_or(context, "remainingCalories", "N/A");
    let protein = ctx_or(context, "remainingProtein", "N/A");
    let carbs = ctx_or(context, "remainingCarbs", "N/A");
    let fat = ctx_or(context, "remainingFat", "N/A");

    format!(
        r#"You are VitalQuest AI Health Coach.
TASK: Determine if the user is LOGGING a meal they ate, or ASKING for a suggestion.

CONTEXT:
- Planned Meal: {planned} (Reference ONLY)
- Meal Type: {meal_type}
- Goal: {goal}
- User Request: {request} (PRIORITIZE THIS)
- Remaining Calories today: {calories}
- Remaining Macros: Protein: {protein}, Carbs: {carbs}, Fat: {fat}
- User Preferences: {memory}

RULES:
1. **LOGGING MODE**: IF the user says "I ate...", "I had...", "I consumed...", or lists specific food items (e.g. "2 idly"), assume they have ALREADY eaten it.
   - OUTPUT the nutritional info for THAT FOOD.
   - DO NOT suggest an alternative.
   - Set "suggestion" to the name of the food they ate suitable for a title (e.g. "2 Idly & Sambar").

2. **SUGGESTION MODE**: IF the user asks "What should I eat?", "Suggest something", or "I don't like this", then suggest a NEW meal.
   - Ensure it fits the remaining budget.
   - **CRITICAL**: Suggest a meal appropriate for **{meal_type}**. (e.g. Breakfast foods for Breakfast, etc).
   - **CRITICAL**: Ensure the suggestion aligns with the USER GOAL ({goal}).
     - **For Weight Loss**: Suggest **steamed** (e.g. Idli, Puttu), **grilled**, or **dry** options (e.g. Thoran, Roast) rather than rich gravies (Stew, Korma) containing heavy coconut milk/cream.

3. Provide exact nutritional estimates for whichever mode is active.
4. Respond with JSON ONLY.

OUTPUT JSON:
{{
  "suggestion": "Name of the dish",
  "description": "Short description of the dish",
  "calories": number,
  "protein": number,
  "carbs": number,
  "fat": number,
  "notes": "Brief explanation of why this is a good choice"
}}"#
    )
}

fn ingredient_suggest_prompt(message: Option<&str>, context: Option<&Value>, memory: &str) -> String {
    let input = match message {
        Some(m) if !m.is_empty() => m,
        _ => "See image",
    };
    let meal_slot = ctx_or(context, "mealType", "Next meal");
    let calories = ctx_or(context, "remainingCalories", "N/A");

    format!(
        r#"You are VitalQuest AI Health Coach.
TASK: Recommend what to cook based on the provided ingredients or food photo.

CONTEXT:
- Input: {input}
- Meal Slot: {meal_slot}
- Remaining Budget: {calories} calories
- User Preferences: {memory}

RULES:
1. If ingredients are provided, suggest a simple recipe.
2. If a food item is shown/described, analyze it and suggest if it fits.
3. Prioritize user's dietary and regional preferences.
4. Respond with JSON ONLY.

OUTPUT JSON:
{{
  "suggestion": "Recipe Name / Dish Name",
  "description": "Preparation steps or dish details",
  "calories": number,
  "protein": number,
  "carbs": number,
  "fat": number,
  "notes": "Why this fits today's goals"
}}"#
    )
}
