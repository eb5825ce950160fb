use crate::core::{Document, ReplacementRequest};

pub struct TemplateFiller;

impl TemplateFiller {
    /// 依序套用每組替換；段落內所有出現處都會被取代。
    /// 回傳被改寫的段落數。
    pub fn apply(document: &mut Document, request: &ReplacementRequest) -> usize {
        let mut touched = vec![false; document.paragraphs.len()];

        for item in request.iter() {
            if item.placeholder.is_empty() {
                tracing::debug!("Skipping {} with empty placeholder", item.field);
                continue;
            }

            for (index, paragraph) in document.paragraphs.iter_mut().enumerate() {
                if paragraph.text.contains(&item.placeholder) {
                    paragraph.text = paragraph.text.replace(&item.placeholder, &item.replacement);
                    touched[index] = true;
                    tracing::debug!("Replaced {} in paragraph {}", item.field, index);
                }
            }
        }

        touched.into_iter().filter(|t| *t).count()
    }
}
