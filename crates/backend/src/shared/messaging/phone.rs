/// Убирает префикс канала (`whatsapp:`) из адреса провайдера
pub fn strip_channel_prefix(address: &str) -> &str {
    let address = address.trim();
    address
        .strip_prefix("whatsapp:")
        .unwrap_or(address)
        .trim()
}

/// Номер телефона Бразилии в E.164: `+55` + DDD + номер.
///
/// Принимает `(11) 98765-4321`, `5511987654321`, `+55 11 98765-4321`,
/// `whatsapp:+55...`, номер с ведущим нулём. `None` для всего остального.
pub fn normalize_br_phone(raw: &str) -> Option<String> {
    let digits: String = strip_channel_prefix(raw)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    let digits = digits.trim_start_matches('0');

    let national = match digits.len() {
        12 | 13 if digits.starts_with("55") => &digits[2..],
        10 | 11 => digits,
        _ => return None,
    };

    let ddd = &national[..2];
    if ddd.starts_with('0') || ddd.ends_with('0') {
        return None;
    }
    let number = &national[2..];
    // мобильные из 9 цифр начинаются с 9
    if number.len() == 9 && !number.starts_with('9') {
        return None;
    }
    Some(format!("+55{}", national))
}

pub fn to_whatsapp_address(e164: &str) -> String {
    format!("whatsapp:{}", e164)
}
