/// Параметры запроса PostgREST (`select`, фильтры, сортировка, лимит)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.to_string())
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lte", value)
    }

    /// `column=in.(a,b,c)`; значения с запятыми берутся в кавычки
    pub fn in_list<S: AsRef<str>>(self, column: &str, values: &[S]) -> Self {
        let list = values
            .iter()
            .map(|v| {
                let v = v.as_ref();
                if v.contains(',') || v.contains('"') {
                    format!("\"{}\"", v.replace('"', "\\\""))
                } else {
                    v.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        self.param(column, format!("in.({})", list))
    }

    /// `order=column.asc` / `column.desc`
    pub fn order(self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.param("order", format!("{}.{}", column, dir))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.param("limit", limit.to_string())
    }

    pub fn offset(self, offset: usize) -> Self {
        self.param("offset", offset.to_string())
    }

    fn filter(self, column: &str, op: &str, value: impl ToString) -> Self {
        self.param(column, format!("{}.{}", op, value.to_string()))
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builds_postgrest_params() {
        let q = Query::new()
            .select("*")
            .gte("data_hora", "2024-01-01")
            .lt("data_hora", "2024-02-01")
            .order("data_hora", true)
            .limit(1000);

        assert_eq!(
            q.params(),
            &[
                ("select".to_string(), "*".to_string()),
                ("data_hora".to_string(), "gte.2024-01-01".to_string()),
                ("data_hora".to_string(), "lt.2024-02-01".to_string()),
                ("order".to_string(), "data_hora.asc".to_string()),
                ("limit".to_string(), "1000".to_string()),
            ]
        );
        assert!(q.has("limit"));
        assert!(!q.has("offset"));
    }

    #[test]
    fn test_in_list_quotes_values_with_commas() {
        let q = Query::new().in_list("phone", &["+5511999990000", "a,b"]);
        assert_eq!(q.params()[0].1, "in.(+5511999990000,\"a,b\")");
    }
}
