use std::collections::HashMap;

/// Строка CSV: заголовок (в нижнем регистре) -> значение
#[derive(Debug, Clone, Default)]
pub struct CsvRow {
    fields: HashMap<String, String>,
}

impl CsvRow {
    /// Поле по имени заголовка (без учёта регистра), `None` если пусто
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Сырое значение без trim (для хеша дедупликации)
    pub fn raw(&self, name: &str) -> &str {
        self.fields
            .get(&name.to_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
        }
    }
}

/// Результат чтения файла
#[derive(Debug, Default)]
pub struct CsvRows {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
    /// Записи, которые не удалось прочитать
    pub malformed: usize,
}

/// Убрать BOM и служебный префикс `IMTString(N):` экспорта POS
pub fn clean_text(text: &str) -> &str {
    let text = text.trim_start_matches('\u{feff}');
    let text = match text.strip_prefix("IMTString(") {
        Some(rest) => rest
            .find("):")
            .map(|idx| &rest[idx + 2..])
            .unwrap_or(text),
        None => text,
    };
    text.trim()
}

/// Прочитать CSV с фиксированным разделителем
pub fn read_csv(text: &str, delimiter: char) -> anyhow::Result<CsvRows> {
    let text = clean_text(text);
    if text.is_empty() {
        return Ok(CsvRows::default());
    }

    let delimiter = u8::try_from(delimiter)
        .map_err(|_| anyhow::anyhow!("CSV delimiter must be a single-byte character"))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|s| s.trim().to_lowercase()).collect(),
        Err(e) => anyhow::bail!("Failed to read CSV headers: {}", e),
    };

    let mut result = CsvRows {
        headers: headers.clone(),
        ..Default::default()
    };

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping malformed CSV record: {}", e);
                result.malformed += 1;
                continue;
            }
        };
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        result.rows.push(CsvRow { fields });
    }

    Ok(result)
}
