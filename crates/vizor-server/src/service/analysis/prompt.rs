//! Instructions sent with the image.

/// Asks for a bare JSON array of the physical objects on the photo.
pub const OBJECT_DETECTION_PROMPT: &str = "Ты - эксперт по анализу изображений. \
Твоя задача - перечислить основные физические предметы на фото. \
Верни ТОЛЬКО JSON массив строк. Например: [\"стол\", \"стул\"]. \
Не пиши ничего кроме JSON.";

/// Asks for the materials of each confirmed object as `objectName`/`materials` records.
pub fn material_detection_prompt(objects: &[String]) -> String {
    format!(
        "На изображении присутствуют следующие предметы: {}. \
         Для каждого предмета определи материал, из которого он сделан (например: металл, дерево, пластик). \
         Верни ТОЛЬКО JSON массив объектов с полями 'objectName' и 'materials' (массив строк). \
         Пример: [{{\"objectName\": \"стол\", \"materials\": [\"металл\"]}}]",
        objects.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_prompt_lists_objects() {
        let prompt = material_detection_prompt(&["стол".to_owned(), "стул".to_owned()]);

        assert!(prompt.starts_with("На изображении присутствуют следующие предметы: стол, стул. "));
        assert!(prompt.ends_with("[{\"objectName\": \"стол\", \"materials\": [\"металл\"]}]"));
    }

    #[test]
    fn detection_prompt_asks_for_json_only() {
        assert!(OBJECT_DETECTION_PROMPT.contains("Например: [\"стол\", \"стул\"]. Не пиши"));
    }
}
