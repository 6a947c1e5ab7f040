//! Analytical rubric prompts.
//!
//! Both strategies share the same rubric and output schema; only the
//! content section differs (transcript text vs. the video itself).

/// Analytical rubric shared by both strategies.
const RUBRIC: &str = r#"You are a content-risk analyst monitoring short-form social video from francophone Central and West Africa.
Assess the content along these dimensions:
- Politics: political messaging, calls to action, references to parties, elections, or government figures.
- Security: threats, armed groups, incitement to violence, references to ongoing conflicts.
- Community tensions: tribal or community references, stigmatization of groups.
- Economy: prices, scarcity, unemployment, currency concerns.
- Misinformation: unverifiable or demonstrably false claims, manipulated framing.
- Hate speech: slurs, dehumanizing language, targeted harassment.
- Language: which languages are spoken (French, English, local languages) and whether they are mixed."#;

/// Output schema the model must follow exactly.
const SCHEMA: &str = r#"Return ONLY a single JSON object with exactly this schema, no other text:
{
  "summary": "Two to three sentence summary of the content",
  "key_points": ["ordered key points"],
  "sentiment": "positive|negative|neutral|mixed",
  "topics": ["topic"],
  "risk_flags": ["specific risk observed"],
  "credibility_score": 0,
  "misinformation_flags": ["claim that appears false or unverifiable"],
  "content_type": "news|opinion|entertainment|testimony|speech|other",
  "detected_languages": ["fr"],
  "hate_speech": false,
  "violence_incitation": false,
  "risk_level": "low|medium|high",
  "regional_context": {
    "political_content": false,
    "tribal_references": [],
    "economic_concerns": [],
    "security_threats": [],
    "regional_references": []
  },
  "linguistic_profile": {
    "has_french": false,
    "has_english": false,
    "has_local_languages": false,
    "mixed_language": false
  }
}
Every field is mandatory. credibility_score is an integer from 0 to 100.
Arrays may be empty but must be present."#;

/// Build the prompt for the transcript strategy.
pub fn transcript_prompt(transcript: &str, title: &str, channel: &str) -> String {
    format!(
        "{RUBRIC}\n\n\
         Video title: {title}\n\
         Channel: {channel}\n\n\
         TRANSCRIPT:\n{transcript}\n\n\
         {SCHEMA}"
    )
}

/// Build the prompt for the direct-URL strategy.
///
/// The video itself is attached as a separate part; this prompt only
/// carries the rubric and metadata.
pub fn video_prompt(title: &str, channel: &str) -> String {
    format!(
        "{RUBRIC}\n\n\
         Video title: {title}\n\
         Channel: {channel}\n\n\
         Watch the attached video, including its audio track, then assess it.\n\n\
         {SCHEMA}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_prompt_embeds_content_and_schema() {
        let prompt = transcript_prompt("Bonjour à tous", "T", "C");
        assert!(prompt.contains("TRANSCRIPT:\nBonjour à tous"));
        assert!(prompt.contains("Video title: T"));
        assert!(prompt.contains("\"credibility_score\""));
        assert!(prompt.contains("Every field is mandatory"));
    }

    #[test]
    fn test_video_prompt_has_no_transcript_section() {
        let prompt = video_prompt("T", "C");
        assert!(!prompt.contains("TRANSCRIPT"));
        assert!(prompt.contains("attached video"));
        assert!(prompt.contains("\"risk_level\""));
    }
}
