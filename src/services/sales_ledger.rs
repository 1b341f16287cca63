// src/services/sales_ledger.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{document_store::Page, FabricRepository, SalesRepository},
    models::{
        auth::SessionUser,
        inventory::Fabric,
        sales::{
            FabricSale, FabricSaleInput, FabricSalePatch, FabricSaleRecord, LedgerReceipt,
            LedgerWarning, NewPayment, NewTransaction, PaymentStatus, SaleDeletion, SaleItem,
            StockAdjustment, TransactionType,
        },
    },
    services::permissions,
};

use crate::models::sales::encode_items;

// ---
// Funções puras
// ---

/// "paid" quando o pagamento cobre o total líquido (limite inclusivo).
pub fn payment_status(total: Decimal, discount: Decimal, payment: Decimal) -> PaymentStatus {
    if payment >= total - discount {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Pending
    }
}

/// Aplica o delta e trava em zero. Nunca falha.
pub fn clamp_stock(current: Decimal, delta: Decimal) -> Decimal {
    (current + delta).max(Decimal::ZERO)
}

fn fabric_in_shop(fabric: &Fabric, shop_id: &str) -> bool {
    fabric.shop_id.as_ref().map(|s| s.id()) == Some(shop_id)
}

/// Delta de estoque por tecido entre duas versões dos itens:
/// `quantidade antiga - quantidade nova`, somando itens repetidos.
/// Positivo devolve estoque, negativo consome. Deltas zero são omitidos.
pub fn stock_deltas(old: &[SaleItem], new: &[SaleItem]) -> BTreeMap<String, Decimal> {
    let mut deltas: BTreeMap<String, Decimal> = BTreeMap::new();

    for item in old {
        *deltas.entry(item.fabric_id.clone()).or_default() += item.quantity;
    }
    for item in new {
        *deltas.entry(item.fabric_id.clone()).or_default() -= item.quantity;
    }

    deltas.retain(|_, delta| !delta.is_zero());
    deltas
}

// ---
// Livro de vendas de tecido
// ---
// Transação -> venda -> pagamento -> estoque, em sequência e sem
// transação entre os passos. Falhas depois da venda gravada não desfazem
// nada: viram `LedgerWarning` no recibo e `tracing::error!` no log.
#[derive(Clone)]
pub struct SalesLedger {
    sales_repo: SalesRepository,
    fabric_repo: FabricRepository,
    restore_stock_on_delete: bool,
}

impl SalesLedger {
    pub fn new(sales_repo: SalesRepository, fabric_repo: FabricRepository, restore_stock_on_delete: bool) -> Self {
        Self { sales_repo, fabric_repo, restore_stock_on_delete }
    }

    pub async fn create_fabric_sale(
        &self,
        user: &SessionUser,
        shop_id: &str,
        input: &FabricSaleInput,
    ) -> Result<LedgerReceipt, AppError> {
        input.validate()?;
        require_seller(user, shop_id)?;
        self.check_fabrics(shop_id, &input.items).await?;

        let now = Utc::now();
        let seller_id = user.profile.id.as_str();
        let customer_id = input.customer_id.as_deref();

        // 1. Transação
        let transaction = self
            .sales_repo
            .create_transaction(&NewTransaction {
                kind: TransactionType::FabricSale,
                transaction_date: now,
                total_amount: input.total_amount,
                shop_id,
                customer_id,
                created_by: seller_id,
            })
            .await?;

        // 2. Venda (itens serializados) referenciando a transação
        let record = FabricSaleRecord {
            transaction_id: &transaction.id,
            shop_id,
            customer_id,
            seller_id,
            items: encode_items(&input.items)?,
            total_amount: input.total_amount,
            discount_amount: input.discount_amount,
            payment_amount: input.payment_amount,
            payment_status: payment_status(input.total_amount, input.discount_amount, input.payment_amount),
            sale_date: now,
            notes: input.notes.as_deref(),
        };
        let sale = match self.sales_repo.create_sale(&record).await {
            Ok(sale) => sale,
            Err(e) => {
                tracing::error!("Transação {} ficou sem venda: {}", transaction.id, e);
                return Err(e);
            }
        };

        let mut warnings = Vec::new();

        // 3. Pagamento, se houver valor pago
        let payment = if input.payment_amount > Decimal::ZERO {
            let new_payment = NewPayment {
                transaction_id: &transaction.id,
                shop_id,
                customer_id,
                amount: input.payment_amount,
                payment_method: input.payment_method.as_deref(),
                payment_date: now,
                received_by: seller_id,
            };
            match self.sales_repo.create_payment(&new_payment).await {
                Ok(payment) => Some(payment),
                Err(e) => {
                    tracing::error!("Venda {} gravada sem pagamento: {}", sale.id, e);
                    warnings.push(LedgerWarning::PaymentNotRecorded { reason: e.to_string() });
                    None
                }
            }
        } else {
            None
        };

        // 4. Baixa de estoque por tecido
        let (adjustments, stock_warnings) = self.apply_deltas(shop_id, &sale.id, &stock_deltas(&[], &input.items)).await;
        warnings.extend(stock_warnings);

        tracing::info!(
            "Venda {} registrada na loja {} ({} itens, {} avisos)",
            sale.id,
            shop_id,
            input.items.len(),
            warnings.len()
        );

        Ok(LedgerReceipt { transaction: Some(transaction), sale, payment, adjustments, warnings })
    }

    /// Reescreve os itens e totais e reconcilia o estoque pela diferença
    /// por tecido. A transação e o pagamento originais não são tocados.
    /// Qualquer cargo com acesso ao painel na loja pode editar, não só
    /// quem vendeu.
    pub async fn update_fabric_sale(
        &self,
        user: &SessionUser,
        shop_id: &str,
        sale_id: &str,
        input: &FabricSaleInput,
    ) -> Result<LedgerReceipt, AppError> {
        input.validate()?;
        require_seller(user, shop_id)?;

        // 1. Venda atual (itens já normalizados na leitura)
        let existing = self.get_fabric_sale(shop_id, sale_id).await?;
        self.check_fabrics(shop_id, &input.items).await?;

        // 2-4. Novos itens, status recalculado, gravação
        let patch = FabricSalePatch {
            items: encode_items(&input.items)?,
            total_amount: input.total_amount,
            discount_amount: input.discount_amount,
            payment_amount: input.payment_amount,
            payment_status: payment_status(input.total_amount, input.discount_amount, input.payment_amount),
            customer_id: input.customer_id.as_deref(),
            notes: input.notes.as_deref(),
        };
        let sale = self.sales_repo.update_sale(sale_id, &patch).await?;

        // 5. Reconciliação por tecido
        let deltas = stock_deltas(&existing.items, &input.items);
        let (adjustments, warnings) = self.apply_deltas(shop_id, &sale.id, &deltas).await;

        tracing::info!(
            "Venda {} atualizada por {} ({} tecidos reconciliados)",
            sale.id,
            user.profile.id,
            adjustments.len()
        );

        Ok(LedgerReceipt { transaction: None, sale, payment: None, adjustments, warnings })
    }

    /// Remove só a venda. O estoque só volta com `restore_stock_on_delete`.
    pub async fn delete_fabric_sale(
        &self,
        user: &SessionUser,
        shop_id: &str,
        sale_id: &str,
    ) -> Result<SaleDeletion, AppError> {
        if !permissions::can_manage_shop(permissions::role_in_shop(user, shop_id)) {
            return Err(AppError::forbidden("records_management_denied"));
        }

        let sale = self.get_fabric_sale(shop_id, sale_id).await?;
        self.sales_repo.delete_sale(sale_id).await?;

        let (adjustments, warnings) = if self.restore_stock_on_delete {
            self.apply_deltas(shop_id, sale_id, &stock_deltas(&sale.items, &[])).await
        } else {
            tracing::info!("Venda {} removida sem devolver estoque", sale_id);
            (Vec::new(), Vec::new())
        };

        Ok(SaleDeletion { sale_id: sale.id, adjustments, warnings })
    }

    pub async fn get_fabric_sale(&self, shop_id: &str, sale_id: &str) -> Result<FabricSale, AppError> {
        let sale = self.sales_repo.get_sale(sale_id).await?;

        // Venda de outra loja é tratada como inexistente.
        if sale.shop_id.as_ref().map(|s| s.id()) != Some(shop_id) {
            return Err(AppError::not_found("fabric_sales", sale_id));
        }
        Ok(sale)
    }

    pub async fn list_fabric_sales(&self, shop_id: &str, page: &Page) -> Result<Vec<FabricSale>, AppError> {
        self.sales_repo.list_sales(shop_id, page).await
    }

    /// Tecido de outra loja recusa a venda inteira antes de qualquer
    /// gravação. Tecido inexistente passa e vira aviso no ajuste de estoque.
    async fn check_fabrics(&self, shop_id: &str, items: &[SaleItem]) -> Result<(), AppError> {
        let fabric_ids: BTreeSet<&str> = items.iter().map(|i| i.fabric_id.as_str()).collect();

        for fabric_id in fabric_ids {
            match self.fabric_repo.get(fabric_id).await {
                Ok(fabric) if fabric_in_shop(&fabric, shop_id) => {}
                Ok(_) => {
                    tracing::warn!("Venda na loja {} recusada: tecido {} é de outra loja", shop_id, fabric_id);
                    return Err(AppError::not_found("fabrics", fabric_id));
                }
                Err(AppError::DocumentNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn apply_deltas(
        &self,
        shop_id: &str,
        sale_id: &str,
        deltas: &BTreeMap<String, Decimal>,
    ) -> (Vec<StockAdjustment>, Vec<LedgerWarning>) {
        let mut adjustments = Vec::new();
        let mut warnings = Vec::new();

        for (fabric_id, delta) in deltas {
            match self.adjust_stock(shop_id, fabric_id, *delta).await {
                Ok(adjustment) => adjustments.push(adjustment),
                Err(e) => {
                    tracing::error!(
                        "Estoque do tecido {} não ajustado ({}) na venda {}: {}",
                        fabric_id,
                        delta,
                        sale_id,
                        e
                    );
                    warnings.push(LedgerWarning::StockNotAdjusted {
                        fabric_id: fabric_id.clone(),
                        delta: *delta,
                        reason: e.to_string(),
                    });
                }
            }
        }

        (adjustments, warnings)
    }

    // Leitura-modificação-escrita sem controle de versão: duas vendas
    // simultâneas do mesmo tecido podem perder uma atualização.
    async fn adjust_stock(&self, shop_id: &str, fabric_id: &str, delta: Decimal) -> Result<StockAdjustment, AppError> {
        let fabric = self.fabric_repo.get(fabric_id).await?;
        if !fabric_in_shop(&fabric, shop_id) {
            return Err(AppError::not_found("fabrics", fabric_id));
        }
        let new_quantity = clamp_stock(fabric.stock_quantity, delta);
        self.fabric_repo.set_stock(fabric_id, new_quantity).await?;

        Ok(StockAdjustment { fabric_id: fabric_id.to_string(), delta, new_quantity })
    }
}

fn require_seller(user: &SessionUser, shop_id: &str) -> Result<(), AppError> {
    if permissions::can_access_dashboard(permissions::role_in_shop(user, shop_id)) {
        Ok(())
    } else {
        Err(AppError::forbidden("dashboard_denied"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::document_store::{DocumentStore, Query},
        models::{inventory::{FabricPayload, FabricRecord}, rbac::Role},
        services::test_support::{memory_store, session_user},
    };
    use std::{str::FromStr, sync::Arc};

    fn dec(v: &str) -> Decimal {
        Decimal::from_str(v).unwrap()
    }

    fn item(fabric_id: &str, quantity: i64) -> SaleItem {
        SaleItem { fabric_id: fabric_id.into(), quantity: Decimal::from(quantity), sale_price: dec("500") }
    }

    fn input(items: Vec<SaleItem>, total: &str, payment: &str) -> FabricSaleInput {
        FabricSaleInput {
            customer_id: Some("c1".into()),
            items,
            total_amount: dec(total),
            discount_amount: Decimal::ZERO,
            payment_amount: dec(payment),
            payment_method: Some("pix".into()),
            notes: None,
        }
    }

    struct Fixture {
        store: Arc<dyn DocumentStore>,
        fabrics: FabricRepository,
        ledger: SalesLedger,
    }

    fn fixture(restore_on_delete: bool) -> Fixture {
        let store = memory_store();
        let fabrics = FabricRepository::new(store.clone(), "fabrics");
        let sales = SalesRepository::new(store.clone(), "transactions", "fabric_sales", "payments");
        Fixture {
            store,
            fabrics: fabrics.clone(),
            ledger: SalesLedger::new(sales, fabrics, restore_on_delete),
        }
    }

    async fn fabric(f: &Fixture, code: &str, stock: i64) -> String {
        fabric_in(f, "s1", code, stock).await
    }

    async fn fabric_in(f: &Fixture, shop_id: &str, code: &str, stock: i64) -> String {
        let payload = FabricPayload {
            name: format!("Tecido {code}"),
            code: code.into(),
            color: None,
            stock_quantity: Decimal::from(stock),
            purchase_price: None,
            sale_price: None,
        };
        f.fabrics.create(&FabricRecord { shop_id, fabric: &payload }).await.unwrap().id
    }

    async fn stock(f: &Fixture, id: &str) -> Decimal {
        f.fabrics.get(id).await.unwrap().stock_quantity
    }

    async fn count(f: &Fixture, collection: &str) -> usize {
        f.store.list(collection, &Query::new()).await.unwrap().len()
    }

    #[test]
    fn payment_status_boundary_is_inclusive() {
        assert_eq!(payment_status(dec("100"), dec("20"), dec("80")), PaymentStatus::Paid);
        assert_eq!(payment_status(dec("100"), dec("20"), dec("79.99")), PaymentStatus::Pending);
        assert_eq!(payment_status(dec("100"), dec("20"), Decimal::ZERO), PaymentStatus::Pending);
    }

    #[test]
    fn stock_never_goes_negative() {
        assert_eq!(clamp_stock(dec("2"), dec("-5")), Decimal::ZERO);
        assert_eq!(clamp_stock(dec("2"), dec("3")), dec("5"));
    }

    #[test]
    fn deltas_are_per_fabric_and_net() {
        let old = vec![item("A", 5), item("B", 2)];
        let new = vec![item("C", 4), item("A", 3)];

        let deltas = stock_deltas(&old, &new);

        assert_eq!(deltas.get("A"), Some(&dec("2")));
        assert_eq!(deltas.get("B"), Some(&dec("2")));
        assert_eq!(deltas.get("C"), Some(&dec("-4")));
        assert_eq!(stock_deltas(&new, &old).get("C"), Some(&dec("4")));
    }

    #[test]
    fn unchanged_and_repeated_items_net_out() {
        let old = vec![item("A", 2), item("A", 3)];
        let new = vec![item("A", 5)];
        assert!(stock_deltas(&old, &new).is_empty());
    }

    #[tokio::test]
    async fn create_writes_all_records_and_decrements_stock() {
        let f = fixture(false);
        let x = fabric(&f, "X", 10).await;
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);

        let receipt = f
            .ledger
            .create_fabric_sale(&seller, "s1", &input(vec![item(&x, 3)], "1500", "1500"))
            .await
            .unwrap();

        assert_eq!(count(&f, "transactions").await, 1);
        assert_eq!(count(&f, "fabric_sales").await, 1);
        assert_eq!(count(&f, "payments").await, 1);
        assert_eq!(receipt.sale.payment_status, PaymentStatus::Paid);
        assert_eq!(receipt.payment.unwrap().amount, dec("1500"));
        assert_eq!(receipt.sale.items, vec![item(&x, 3)]);
        assert!(receipt.warnings.is_empty());
        assert_eq!(stock(&f, &x).await, dec("7"));
    }

    #[tokio::test]
    async fn unpaid_sale_has_no_payment_record() {
        let f = fixture(false);
        let x = fabric(&f, "X", 10).await;
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);

        let receipt = f
            .ledger
            .create_fabric_sale(&seller, "s1", &input(vec![item(&x, 1)], "500", "0"))
            .await
            .unwrap();

        assert!(receipt.payment.is_none());
        assert_eq!(receipt.sale.payment_status, PaymentStatus::Pending);
        assert_eq!(count(&f, "payments").await, 0);
    }

    #[tokio::test]
    async fn overselling_clamps_to_zero() {
        let f = fixture(false);
        let x = fabric(&f, "X", 2).await;
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);

        f.ledger
            .create_fabric_sale(&seller, "s1", &input(vec![item(&x, 5)], "2500", "0"))
            .await
            .unwrap();

        assert_eq!(stock(&f, &x).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn update_reconciles_only_the_difference() {
        let f = fixture(false);
        let x = fabric(&f, "X", 10).await;
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);
        let receipt = f
            .ledger
            .create_fabric_sale(&seller, "s1", &input(vec![item(&x, 3)], "1500", "1500"))
            .await
            .unwrap();

        let updated = f
            .ledger
            .update_fabric_sale(&seller, "s1", &receipt.sale.id, &input(vec![item(&x, 5)], "2500", "1500"))
            .await
            .unwrap();

        assert_eq!(stock(&f, &x).await, dec("5"));
        assert_eq!(updated.adjustments.len(), 1);
        assert_eq!(updated.adjustments[0].delta, dec("-2"));
        assert_eq!(updated.sale.payment_status, PaymentStatus::Pending);
        assert_eq!(count(&f, "transactions").await, 1);
    }

    #[tokio::test]
    async fn update_tolerates_legacy_item_shapes() {
        let f = fixture(false);
        let a = fabric(&f, "A", 10).await;
        let b = fabric(&f, "B", 10).await;
        // Venda antiga gravada com itens já como objetos.
        let legacy = f
            .store
            .create(
                "fabric_sales",
                None,
                serde_json::json!({
                    "shopId": [{"$id": "s1"}],
                    "items": [{"fabricId": a, "quantity": 4, "sale_price": 100}],
                    "totalAmount": 400,
                    "paymentStatus": "pending"
                })
                .as_object()
                .cloned()
                .unwrap(),
            )
            .await
            .unwrap();

        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);
        f.ledger
            .update_fabric_sale(&seller, "s1", &legacy.id, &input(vec![item(&b, 1)], "500", "0"))
            .await
            .unwrap();

        assert_eq!(stock(&f, &a).await, dec("14"));
        assert_eq!(stock(&f, &b).await, dec("9"));
    }

    #[tokio::test]
    async fn missing_fabric_is_a_warning_not_a_failure() {
        let f = fixture(false);
        let x = fabric(&f, "X", 10).await;
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);

        let receipt = f
            .ledger
            .create_fabric_sale(&seller, "s1", &input(vec![item(&x, 1), item("sumiu", 2)], "1500", "0"))
            .await
            .unwrap();

        assert_eq!(count(&f, "fabric_sales").await, 1);
        assert_eq!(stock(&f, &x).await, dec("9"));
        assert!(matches!(
            receipt.warnings.as_slice(),
            [LedgerWarning::StockNotAdjusted { fabric_id, .. }] if fabric_id == "sumiu"
        ));
    }

    #[tokio::test]
    async fn delete_keeps_stock_unless_restoring_is_enabled() {
        let manager = session_user("ger", Some(Role::Manager), &["s1"]);

        let f = fixture(false);
        let x = fabric(&f, "X", 10).await;
        let sale = f.ledger.create_fabric_sale(&manager, "s1", &input(vec![item(&x, 3)], "1500", "0")).await.unwrap();
        let deletion = f.ledger.delete_fabric_sale(&manager, "s1", &sale.sale.id).await.unwrap();
        assert!(deletion.adjustments.is_empty());
        assert_eq!(stock(&f, &x).await, dec("7"));
        assert_eq!(count(&f, "fabric_sales").await, 0);

        let f = fixture(true);
        let x = fabric(&f, "X", 10).await;
        let sale = f.ledger.create_fabric_sale(&manager, "s1", &input(vec![item(&x, 3)], "1500", "0")).await.unwrap();
        f.ledger.delete_fabric_sale(&manager, "s1", &sale.sale.id).await.unwrap();
        assert_eq!(stock(&f, &x).await, dec("10"));
    }

    #[tokio::test]
    async fn sales_are_scoped_to_their_shop() {
        let f = fixture(false);
        let x = fabric(&f, "X", 10).await;
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);
        let receipt = f.ledger.create_fabric_sale(&seller, "s1", &input(vec![item(&x, 1)], "500", "0")).await.unwrap();

        let other = f.ledger.get_fabric_sale("s2", &receipt.sale.id).await;
        assert!(matches!(other, Err(AppError::DocumentNotFound { .. })));

        let denied = f.ledger.delete_fabric_sale(&seller, "s1", &receipt.sale.id).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn empty_sale_is_rejected_before_any_write() {
        let f = fixture(false);
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);
        let result = f.ledger.create_fabric_sale(&seller, "s1", &input(vec![], "0", "0")).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(count(&f, "transactions").await, 0);
    }

    #[tokio::test]
    async fn fabric_from_another_shop_rejects_the_whole_sale() {
        let f = fixture(false);
        let own = fabric(&f, "X", 10).await;
        let foreign = fabric_in(&f, "s2", "Y", 10).await;
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);

        let result = f
            .ledger
            .create_fabric_sale(&seller, "s1", &input(vec![item(&own, 1), item(&foreign, 4)], "2500", "2500"))
            .await;

        assert!(matches!(result, Err(AppError::DocumentNotFound { ref id, .. }) if *id == foreign));
        assert_eq!(count(&f, "transactions").await, 0);
        assert_eq!(count(&f, "fabric_sales").await, 0);
        assert_eq!(count(&f, "payments").await, 0);
        assert_eq!(stock(&f, &own).await, dec("10"));
        assert_eq!(stock(&f, &foreign).await, dec("10"));

        // Trocar um item por tecido de outra loja na edição também é recusado.
        let receipt = f
            .ledger
            .create_fabric_sale(&seller, "s1", &input(vec![item(&own, 1)], "500", "0"))
            .await
            .unwrap();
        let result = f
            .ledger
            .update_fabric_sale(&seller, "s1", &receipt.sale.id, &input(vec![item(&foreign, 2)], "1000", "0"))
            .await;
        assert!(matches!(result, Err(AppError::DocumentNotFound { .. })));
        assert_eq!(stock(&f, &own).await, dec("9"));
        assert_eq!(stock(&f, &foreign).await, dec("10"));
        let kept = f.ledger.get_fabric_sale("s1", &receipt.sale.id).await.unwrap();
        assert_eq!(kept.items, vec![item(&own, 1)]);
    }

    #[tokio::test]
    async fn editing_requires_dashboard_access_in_that_shop() {
        let f = fixture(false);
        let x = fabric(&f, "X", 10).await;
        let seller = session_user("vend", Some(Role::Salesman), &["s1"]);
        let receipt = f.ledger.create_fabric_sale(&seller, "s1", &input(vec![item(&x, 1)], "500", "0")).await.unwrap();

        // Outro vendedor da mesma loja pode editar.
        let colleague = session_user("colega", Some(Role::Salesman), &["s1"]);
        f.ledger
            .update_fabric_sale(&colleague, "s1", &receipt.sale.id, &input(vec![item(&x, 2)], "1000", "0"))
            .await
            .unwrap();

        let outsider = session_user("fora", Some(Role::Salesman), &["s2"]);
        let denied = f
            .ledger
            .update_fabric_sale(&outsider, "s1", &receipt.sale.id, &input(vec![item(&x, 5)], "2500", "0"))
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let pending = session_user("novo", Some(Role::User), &["s1"]);
        let denied = f
            .ledger
            .update_fabric_sale(&pending, "s1", &receipt.sale.id, &input(vec![item(&x, 5)], "2500", "0"))
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert_eq!(stock(&f, &x).await, dec("8"));
    }
}
