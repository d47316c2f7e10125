//! Canned outbound texts. Spanish, WhatsApp `*bold*` markdown, in the
//! register the business uses with its customers.

use crate::catalog::ProductCatalog;
use crate::domain::order::{OrderDraft, OrderItem, OrderTotals};

pub const BOT_NAME: &str = "Hembi";

pub fn greeting() -> String {
    format!(
        "¡Hola! 👋 Gracias por contactar a *{BOT_NAME}*. ¿En qué puedo ayudarte hoy?\n\n\
         Para hacer un pedido escribe por ejemplo: *\"2 garrafones\"*."
    )
}

pub fn order_prompt() -> String {
    "¡Con gusto! 💧 Dime qué necesitas y cuántos.\n\n\
     Por ejemplo: *\"2 garrafones\"* o *\"1 garrafón y 3 botellas\"*."
        .to_string()
}

pub fn tracking() -> String {
    "📦 Para dar seguimiento a tu pedido, compártenos tu número de orden \
     (empieza con *PSJ*) y un agente lo revisará enseguida."
        .to_string()
}

pub fn prices(catalog: &ProductCatalog) -> String {
    let mut lines = vec!["💰 *Nuestros precios*".to_string(), String::new()];
    for entry in catalog.entries() {
        lines.push(format!("• {} — ${}", entry.product.name, entry.product.unit_price));
    }
    lines.push(String::new());
    lines.push("🚚 Envío *gratis* en pedidos de $100.00 o más.".to_string());
    lines.join("\n")
}

pub fn info() -> String {
    format!(
        "🤖 *Menú de {BOT_NAME}*\n\n\
         Puedo ayudarte con:\n\
         • *Pedidos* - Escribe por ejemplo \"2 garrafones\"\n\
         • *Precios* - Consultar tarifas\n\
         • *Seguimiento* - Estado de tu pedido\n\n\
         🕐 Horario: Lunes a Sábado, 9:00 AM - 6:00 PM."
    )
}

pub fn human_handoff() -> String {
    "Te he transferido con nuestro equipo. 🧑‍💼\n\n\
     Un agente te responderá pronto dentro de nuestro horario de atención."
        .to_string()
}

pub fn fallback() -> String {
    "Gracias por tu mensaje. 📝\n\n\
     Para hacer un pedido escribe por ejemplo *\"2 garrafones\"*, \
     o escribe *\"ayuda\"* para ver el menú."
        .to_string()
}

pub fn clarify_order() -> String {
    "No logré entender tu pedido. 🙈\n\n\
     Indícame cantidad y producto, por ejemplo: *\"2 garrafones\"* o *\"3 botellas\"*."
        .to_string()
}

pub fn order_started(items: &[OrderItem]) -> String {
    let totals = OrderTotals::for_items(items);
    format!(
        "¡Perfecto! 📋 Tu pedido:\n\n{}\n{}\n\n\
         📍 Ahora compárteme tu *dirección completa* (calle, número y colonia).",
        render_items(items),
        render_totals(&totals),
    )
}

pub fn address_retry() -> String {
    "Esa dirección se ve muy corta. 🤏\n\n\
     Compárteme tu *dirección completa* con calle, número y colonia."
        .to_string()
}

pub fn phone_prompt() -> String {
    "¡Gracias! 📍 Ahora compárteme un *teléfono de contacto* a 10 dígitos.".to_string()
}

pub fn phone_retry() -> String {
    "Ese número se ve incompleto. ☎️\n\n\
     Compárteme un teléfono de contacto a *10 dígitos*."
        .to_string()
}

pub fn payment_options() -> String {
    "💳 ¿Cómo prefieres pagar?\n\n\
     *1* - Efectivo\n\
     *2* - Transferencia\n\
     *3* - Tarjeta\n\n\
     Responde con el número o el nombre de la opción."
        .to_string()
}

pub fn payment_retry() -> String {
    format!("No reconocí esa forma de pago. 🙈\n\n{}", payment_options())
}

pub fn confirmation_summary(draft: &OrderDraft) -> String {
    let totals = OrderTotals::for_items(&draft.items);
    format!(
        "📋 *Resumen de tu pedido*\n\n{}\n{}\n\n\
         📍 Dirección: {}\n\
         ☎️ Teléfono: {}\n\
         💳 Pago: {}\n\n\
         Escribe *confirmar* para cerrar tu pedido, *modificar* para cambiar algo, \
         o *cancelar* para descartarlo.",
        render_items(&draft.items),
        render_totals(&totals),
        draft.address.as_deref().unwrap_or("-"),
        draft.phone.as_deref().unwrap_or("-"),
        draft.payment_method.map(|method| method.label()).unwrap_or("-"),
    )
}

pub fn confirm_retry() -> String {
    "Solo necesito una palabra más: 😊\n\n\
     *confirmar*, *modificar* o *cancelar*."
        .to_string()
}

pub fn order_confirmed(order_id: &str) -> String {
    format!(
        "✅ ¡Pedido confirmado!\n\n\
         Tu número de orden es *{order_id}*.\n\
         En breve saldrá tu entrega. ¡Gracias por tu compra! 💧"
    )
}

pub fn order_cancelled() -> String {
    "❌ Pedido cancelado.\n\n\
     Cuando quieras hacer otro, solo escribe por ejemplo *\"2 garrafones\"*."
        .to_string()
}

pub fn modify_prompt() -> String {
    "Claro, vamos a ajustarlo. ✏️\n\n\
     Compárteme de nuevo tu *dirección completa* para continuar."
        .to_string()
}

pub fn restart_needed() -> String {
    "Disculpa, perdí el hilo de la conversación. 🙏\n\n\
     Empecemos de nuevo: escribe por ejemplo *\"2 garrafones\"* para hacer tu pedido."
        .to_string()
}

fn render_items(items: &[OrderItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "• {} x{} — ${}",
                item.display_name,
                item.quantity,
                item.subtotal()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_totals(totals: &OrderTotals) -> String {
    if totals.free_shipping() {
        format!("Total: *${}* (envío gratis 🚚)", totals.grand_total)
    } else {
        format!(
            "Subtotal: ${} + envío ${}\nTotal: *${}*",
            totals.total, totals.shipping_fee, totals.grand_total
        )
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::catalog::ProductCatalog;
    use crate::domain::order::{OrderDraft, OrderItem, PaymentMethod};
    use crate::domain::product::ProductId;

    use super::{confirmation_summary, order_started, prices};

    fn items() -> Vec<OrderItem> {
        vec![OrderItem {
            product_id: ProductId("garrafon-20l".to_string()),
            display_name: "Garrafón 20L".to_string(),
            quantity: 2,
            unit_price: Decimal::new(3_500, 2),
        }]
    }

    #[test]
    fn order_started_lists_items_and_shipping() {
        let text = order_started(&items());
        assert!(text.contains("Garrafón 20L x2 — $70.00"));
        assert!(text.contains("envío $20.00"));
        assert!(text.contains("Total: *$90.00*"));
        assert!(text.contains("dirección"));
    }

    #[test]
    fn confirmation_summary_includes_every_collected_field() {
        let draft = OrderDraft {
            items: items(),
            address: Some("Av. Reforma 222, Col. Centro".to_string()),
            phone: Some("5512345678".to_string()),
            payment_method: Some(PaymentMethod::Transfer),
        };

        let text = confirmation_summary(&draft);
        assert!(text.contains("Av. Reforma 222"));
        assert!(text.contains("5512345678"));
        assert!(text.contains("Transferencia"));
        assert!(text.contains("confirmar"));
    }

    #[test]
    fn prices_renders_the_whole_catalog() {
        let text = prices(&ProductCatalog::default());
        assert!(text.contains("Garrafón 20L — $35.00"));
        assert!(text.contains("Botella 1L — $10.00"));
        assert!(text.contains("Paquete 12 botellas — $95.00"));
    }
}
