//! Prompt templates sent to the text model.

/// Opening turn of a story session.
pub(crate) fn session_intro(story: &str) -> String {
    format!(
        "You are a video generation assistant. I will give you a story and ask you questions about it.\n\
         Remember all details throughout our conversation.\n\
         \n\
         STORY:\n\
         {story}\n\
         \n\
         Acknowledge you understand the story and are ready to help with video generation tasks."
    )
}

pub(crate) fn identify_characters() -> String {
    "Based on the story I gave you, identify all unique characters.\n\
     For each character provide name and physical description.\n\
     \n\
     Return ONLY a JSON array (no other text):\n\
     [{\"name\": \"CharName\", \"description\": \"brief physical description\"}]\n\
     \n\
     If no characters, return: []"
        .to_string()
}

fn name_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}

pub(crate) fn decompose_scenes(character_names: &[String]) -> String {
    let names = name_list(character_names);
    format!(
        "Break the story into 3-5 scenes for video generation.\n\
         Known characters: {names}\n\
         \n\
         For each scene provide:\n\
         - description: Short visual description (1-2 sentences)\n\
         - characters: Which characters appear (from: {names})\n\
         - narration: Voiceover text\n\
         \n\
         Return ONLY a JSON array:\n\
         [{{\"description\": \"...\", \"characters\": [\"...\"], \"narration\": \"...\"}}]"
    )
}

pub(crate) fn image_prompt(scene_description: &str) -> String {
    format!(
        "Create a SHORT image prompt (max 2 sentences) for this scene:\n\
         \"{scene_description}\"\n\
         \n\
         Format: [subject], [action], [setting], [style], [lighting]\n\
         Output ONLY the prompt."
    )
}

pub(crate) fn select_character(scene_description: &str, candidates: &[String]) -> String {
    format!(
        "For this scene: \"{scene_description}\"\n\
         Available characters: {}\n\
         \n\
         Which ONE character is most prominent? Return ONLY the name.",
        name_list(candidates)
    )
}

pub(crate) fn story_from_prompt(context: &str) -> String {
    format!(
        "Generate a creative story of max 200 words about: {context}\n\
         \n\
         Rules:\n\
         - Include 1-2 named characters with brief descriptions\n\
         - Break into clear scenes separated by periods\n\
         - Be imaginative and engaging\n\
         \n\
         Output the story only."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_prompt_lists_known_characters() {
        let prompt = decompose_scenes(&["Ava".to_string(), "Milo".to_string()]);
        assert!(prompt.contains("Known characters: ['Ava', 'Milo']"));
        assert!(prompt.contains("[{\"description\": \"...\""));
    }

    #[test]
    fn intro_embeds_story() {
        assert!(session_intro("Once upon a time.").contains("STORY:\nOnce upon a time."));
    }
}
