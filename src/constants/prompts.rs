//! Prompt templates sent to the quiz assistant.

pub fn categorize_question_prompt(statement: &str, categories: &[String]) -> String {
    format!(
        "I need you to categorize a quiz game question.\n\
         This is the question: '{statement}'\n\
         These are my category options: {categories}\n\
         Tell which of my categories better apply to this question.\n\
         Up to 2 categories.\n\
         If none of my category options fits, answer None.\n\
         Give me just the list of categories, comma separated, nothing else.\n\
         Example: `Astronomy,Politics`\n",
        statement = statement,
        categories = categories.join(", "),
    )
}

pub fn classify_topics_prompt(topics: &[String], categories: &[String]) -> String {
    let topic_lines: Vec<String> = topics.iter().map(|t| format!("- {}", t)).collect();

    format!(
        "I need you to categorize the themes of a quiz game.\n\
         These are the themes:\n{topics}\n\
         These are my category options: {categories}\n\
         For each theme, pick up to 2 of my categories.\n\
         Answer with one line per theme, in the format `theme -> category, category`.\n\
         Give me just those lines, nothing else.\n",
        topics = topic_lines.join("\n"),
        categories = categories.join(", "),
    )
}
