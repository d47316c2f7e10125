use crate::text::{sanitize, tokenize};

/// Classified purpose of an inbound message. `SpecificOrder` means the
/// text already names quantities and products; `Order` is the generic
/// "I want to order something" signal that still needs details.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    Order,
    Tracking,
    Prices,
    Info,
    HumanHandoff,
    SpecificOrder,
    Default,
}

const GREETING_KEYWORDS: &[&str] =
    &["hola", "buenos dias", "buenas tardes", "buenas noches", "buenas", "que tal", "saludos", "hello"];
const ORDER_KEYWORDS: &[&str] =
    &["pedir", "ordenar", "comprar", "un pedido", "quiero agua", "necesito agua"];
const TRACKING_KEYWORDS: &[&str] =
    &["rastrear", "seguimiento", "mi pedido", "donde esta", "cuando llega", "status"];
const PRICES_KEYWORDS: &[&str] = &["precio", "costo", "cuanto", "tarifa", "lista de precios"];
const INFO_KEYWORDS: &[&str] =
    &["informacion", "info", "ayuda", "menu", "horario", "servicios", "ubicacion"];
const HANDOFF_KEYWORDS: &[&str] =
    &["agente", "humano", "asesor", "operador", "hablar con alguien", "persona real"];

/// Fixed precedence order; first table whose keywords match wins.
const KEYWORD_TABLES: &[(Intent, &[&str])] = &[
    (Intent::Greeting, GREETING_KEYWORDS),
    (Intent::Order, ORDER_KEYWORDS),
    (Intent::Tracking, TRACKING_KEYWORDS),
    (Intent::Prices, PRICES_KEYWORDS),
    (Intent::Info, INFO_KEYWORDS),
    (Intent::HumanHandoff, HANDOFF_KEYWORDS),
];

/// Pluggable "does this text look like a concrete order" strategy, so a
/// stronger matcher can replace the token heuristic without touching
/// the state machine contract.
pub trait OrderSignal: Send + Sync {
    fn looks_like_order(&self, sanitized_text: &str) -> bool;
}

/// Default heuristic: a quantity (digits or a spelled-out small number)
/// next to a product-category stem, or "quiero/necesito <digits>".
#[derive(Clone, Debug, Default)]
pub struct QuantityProductSignal;

const CATEGORY_STEMS: &[&str] = &["garraf", "botell", "litro", "paquet", "caja"];
const SPELLED_QUANTITIES: &[&str] =
    &["un", "una", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve", "diez"];

impl OrderSignal for QuantityProductSignal {
    fn looks_like_order(&self, sanitized_text: &str) -> bool {
        // the tokenizer already separates glued forms like "2garrafones"
        let tokens = tokenize(sanitized_text);

        for window in tokens.windows(2) {
            let [first, second] = window else {
                continue;
            };

            let quantity_like = first.chars().all(|character| character.is_ascii_digit())
                || SPELLED_QUANTITIES.contains(&first.as_str());
            if quantity_like && starts_with_category(second) {
                return true;
            }

            if matches!(first.as_str(), "quiero" | "necesito")
                && second.starts_with(|character: char| character.is_ascii_digit())
            {
                return true;
            }
        }

        false
    }
}

fn starts_with_category(token: &str) -> bool {
    !token.is_empty() && CATEGORY_STEMS.iter().any(|stem| token.starts_with(stem))
}

/// Pure function of the input text and the static keyword tables; no
/// side effects beyond classification.
#[derive(Clone, Debug, Default)]
pub struct IntentClassifier<S = QuantityProductSignal> {
    order_signal: S,
}

impl IntentClassifier<QuantityProductSignal> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> IntentClassifier<S>
where
    S: OrderSignal,
{
    pub fn with_signal(order_signal: S) -> Self {
        Self { order_signal }
    }

    pub fn classify(&self, text: &str) -> Intent {
        let sanitized = sanitize(text);
        if sanitized.is_empty() {
            return Intent::Default;
        }

        for (intent, keywords) in KEYWORD_TABLES {
            if keywords.iter().any(|keyword| sanitized.contains(keyword)) {
                return *intent;
            }
        }

        if self.order_signal.looks_like_order(&sanitized) {
            Intent::SpecificOrder
        } else {
            Intent::Default
        }
    }
}
