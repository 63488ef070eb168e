//! Коды ошибок провайдера WhatsApp (Twilio) и их классификация.

/// Класс ошибки отправки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Повтор бессмысленен (номер, шаблон, права)
    Permanent,
    /// Временный сбой: лимиты, перегрузка провайдера
    Retryable,
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorInfo {
    pub code: u32,
    pub class: ErrorClass,
    /// Сообщение для оператора (pt-BR)
    pub message: &'static str,
    /// Номер получателя недоступен навсегда: кандидат в чёрный список
    pub undeliverable: bool,
}

const fn permanent(code: u32, message: &'static str, undeliverable: bool) -> ErrorInfo {
    ErrorInfo {
        code,
        class: ErrorClass::Permanent,
        message,
        undeliverable,
    }
}

const fn retryable(code: u32, message: &'static str) -> ErrorInfo {
    ErrorInfo {
        code,
        class: ErrorClass::Retryable,
        message,
        undeliverable: false,
    }
}

const ERROR_TABLE: &[ErrorInfo] = &[
    permanent(21211, "Número de telefone inválido.", true),
    permanent(21408, "Envio para esta região não está habilitado na conta.", false),
    permanent(21610, "O cliente cancelou o recebimento de mensagens.", false),
    permanent(21614, "O número não é um celular válido.", true),
    permanent(63003, "O número não possui WhatsApp.", true),
    permanent(63016, "Fora da janela de 24h: use um template aprovado.", false),
    permanent(63024, "Destinatário inválido para WhatsApp.", true),
    permanent(63027, "Template não encontrado ou não aprovado.", false),
    permanent(63030, "Parâmetros do template inválidos.", false),
    permanent(63038, "Limite diário de mensagens da conta atingido.", false),
    permanent(20003, "Credenciais do provedor inválidas.", false),
    retryable(20429, "Muitas requisições. Tentando novamente."),
    retryable(63018, "Limite de envio do canal excedido. Tentando novamente."),
    retryable(30001, "Fila de envio cheia. Tentando novamente."),
    retryable(20500, "Erro interno do provedor. Tentando novamente."),
    retryable(20503, "Provedor temporariamente indisponível. Tentando novamente."),
];

pub fn lookup(code: u32) -> Option<&'static ErrorInfo> {
    ERROR_TABLE.iter().find(|e| e.code == code)
}

/// Класс ошибки по коду провайдера и HTTP-статусу.
///
/// HTTP 429 и 5xx временные при любом коде; неизвестные коды постоянные.
pub fn classify(code: Option<u32>, http_status: u16) -> ErrorClass {
    if http_status == 429 || (500..600).contains(&http_status) {
        return ErrorClass::Retryable;
    }
    code.and_then(lookup)
        .map(|e| e.class)
        .unwrap_or(ErrorClass::Permanent)
}

pub fn is_undeliverable(code: Option<u32>) -> bool {
    code.and_then(lookup).map(|e| e.undeliverable).unwrap_or(false)
}

/// Сообщение для пользователя на португальском
pub fn user_message(code: Option<u32>) -> String {
    match code {
        Some(c) => match lookup(c) {
            Some(info) => info.message.to_string(),
            None => format!("Falha no envio (código {}).", c),
        },
        None => "Falha no envio da mensagem.".to_string(),
    }
}
