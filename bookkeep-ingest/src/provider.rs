//! Narrow adapter over the document-AI provider's field trees.
//!
//! The provider returns one nested `fields` object per analyzed document:
//!
//! ```json
//! {"BankName": {"type": "string", "valueString": "Scotiabank", "content": "SCOTIABANK"},
//!  "Accounts": {"type": "array", "valueArray": [{"type": "object", "valueObject": {...}}]}}
//! ```
//!
//! Only the accessors below touch that shape; the canonical model is built
//! from them and never sees provider JSON directly.

use bookkeep_core::coerce::parse_money;
use bookkeep_core::{
    Account, Invoice, InvoiceItem, Receipt, ReceiptItem, RunningBalance, Statement,
    StatementMetadata, StatementPeriod, Transaction,
};
use serde_json::Value;

/// One analyzed document: provider doc type plus its field tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedDocument {
    pub doc_type: String,
    pub fields: FieldTree,
}

/// Every document the provider found in one submitted file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedDocuments {
    pub documents: Vec<AnalyzedDocument>,
    /// The provider's result body as received
    pub raw: Value,
}

impl AnalyzedDocuments {
    /// Read `analyzeResult.documents[]` from a provider result body
    pub fn from_analyze_result(result: &Value) -> Self {
        let documents = result
            .get("documents")
            .and_then(Value::as_array)
            .map(|docs| {
                docs.iter()
                    .map(|doc| AnalyzedDocument {
                        doc_type: doc
                            .get("docType")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        fields: FieldTree::new(
                            doc.get("fields").cloned().unwrap_or(Value::Null),
                        ),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            documents,
            raw: result.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTree(Value);

impl FieldTree {
    pub fn new(fields: Value) -> Self {
        Self(fields)
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// `valueString`, falling back to the raw `content`
    pub fn text(&self, name: &str) -> Option<String> {
        let f = self.field(name)?;
        f.get("valueString")
            .and_then(Value::as_str)
            .or_else(|| f.get("content").and_then(Value::as_str))
            .map(str::to_string)
    }

    /// `valueDate` (already `YYYY-MM-DD`), falling back to `content`
    pub fn date(&self, name: &str) -> Option<String> {
        let f = self.field(name)?;
        f.get("valueDate")
            .and_then(Value::as_str)
            .or_else(|| f.get("content").and_then(Value::as_str))
            .map(str::to_string)
    }

    /// `valueNumber`, then `valueCurrency.amount`, then coerced `content`
    pub fn number(&self, name: &str) -> Option<f64> {
        let f = self.field(name)?;
        f.get("valueNumber")
            .and_then(Value::as_f64)
            .or_else(|| currency_amount(f))
            .or_else(|| f.get("content").and_then(Value::as_str).and_then(parse_money))
    }

    /// `valueCurrency.amount`, then `valueNumber`
    pub fn currency(&self, name: &str) -> Option<f64> {
        let f = self.field(name)?;
        currency_amount(f).or_else(|| f.get("valueNumber").and_then(Value::as_f64))
    }

    /// Text exactly as printed on the document
    pub fn content(&self, name: &str) -> Option<String> {
        self.field(name)?
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// `valueArray[].valueObject` as nested trees
    pub fn objects(&self, name: &str) -> Vec<FieldTree> {
        self.field(name)
            .and_then(|f| f.get("valueArray"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        FieldTree::new(item.get("valueObject").cloned().unwrap_or(Value::Null))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn currency_amount(field: &Value) -> Option<f64> {
    field
        .get("valueCurrency")
        .and_then(|c| c.get("amount"))
        .and_then(Value::as_f64)
}

/// Map one bank statement document onto the canonical model.
///
/// The provider does not report per-line balances, so every running balance
/// is folded from the account's beginning balance.
pub fn statement_from_fields(fields: &FieldTree) -> Statement {
    let accounts = fields
        .objects("Accounts")
        .iter()
        .map(|acct| {
            let beginning_balance = acct.number("BeginningBalance").unwrap_or(0.0);
            let mut balance = RunningBalance::new(beginning_balance);

            let transactions = acct
                .objects("Transactions")
                .iter()
                .map(|tx| {
                    let deposit = tx.number("DepositAmount").unwrap_or(0.0);
                    let withdrawal = tx.number("WithdrawalAmount").unwrap_or(0.0);
                    Transaction {
                        date: tx.date("Date").unwrap_or_default(),
                        description: tx.text("Description").unwrap_or_default(),
                        deposit,
                        withdrawal,
                        running_balance: balance.apply(deposit, withdrawal, None),
                        check_number: tx.text("CheckNumber").unwrap_or_default(),
                        category: tx.text("Category").unwrap_or_default(),
                    }
                })
                .collect();

            Account {
                account_number: acct.text("AccountNumber").unwrap_or_default(),
                account_type: acct.text("AccountType").unwrap_or_default(),
                beginning_balance,
                ending_balance: acct.number("EndingBalance").unwrap_or(0.0),
                transactions,
            }
        })
        .collect();

    Statement {
        metadata: StatementMetadata {
            account_holder: fields.text("AccountHolderName").unwrap_or_default(),
            bank_name: fields.text("BankName").unwrap_or_default(),
            statement_period: StatementPeriod {
                start_date: fields.date("StatementStartDate").unwrap_or_default(),
                end_date: fields.date("StatementEndDate").unwrap_or_default(),
            },
        },
        accounts,
    }
}

/// `index` is 0-based position in the file; receipts are numbered from 1
pub fn receipt_from_fields(index: usize, doc: &AnalyzedDocument) -> Receipt {
    let f = &doc.fields;
    let items = f
        .objects("Items")
        .iter()
        .map(|item| ReceiptItem {
            description: item.text("Description").unwrap_or_default(),
            quantity: item.number("Quantity").unwrap_or(0.0),
            price: item.currency("Price").unwrap_or(0.0),
            total_price: item.currency("TotalPrice").unwrap_or(0.0),
        })
        .collect();

    Receipt {
        receipt_number: document_number(index),
        doc_type: doc.doc_type.clone(),
        merchant_name: f.text("MerchantName").unwrap_or_default(),
        transaction_date: f.date("TransactionDate").unwrap_or_default(),
        items,
        subtotal: f.currency("Subtotal").unwrap_or(0.0),
        tax: f.currency("TotalTax").unwrap_or(0.0),
        tip: f.currency("Tip").unwrap_or(0.0),
        total: f.currency("Total").unwrap_or(0.0),
    }
}

/// Invoices keep the printed `content` of every field
pub fn invoice_from_fields(index: usize, fields: &FieldTree) -> Invoice {
    let content = |name: &str| fields.content(name).unwrap_or_default();
    let items = fields
        .objects("Items")
        .iter()
        .map(|item| InvoiceItem {
            description: item.content("Description").unwrap_or_default(),
            quantity: item.content("Quantity").unwrap_or_default(),
            unit_price: item.content("UnitPrice").unwrap_or_default(),
            amount: item.content("Amount").unwrap_or_default(),
        })
        .collect();

    Invoice {
        invoice_number: document_number(index),
        vendor_name: content("VendorName"),
        vendor_address: content("VendorAddress"),
        customer_name: content("CustomerName"),
        invoice_id: content("InvoiceId"),
        invoice_date: content("InvoiceDate"),
        due_date: content("DueDate"),
        items,
        subtotal: content("SubTotal"),
        total_tax: content("TotalTax"),
        invoice_total: content("InvoiceTotal"),
    }
}

fn document_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bank_fields() -> FieldTree {
        FieldTree::new(json!({
            "AccountHolderName": {"type": "string", "valueString": "JANE DOE"},
            "BankName": {"type": "string", "valueString": "Scotiabank"},
            "StatementStartDate": {"type": "date", "valueDate": "2025-07-01", "content": "Jul 1"},
            "StatementEndDate": {"type": "date", "valueDate": "2025-07-31"},
            "Accounts": {"type": "array", "valueArray": [{
                "type": "object",
                "valueObject": {
                    "AccountNumber": {"type": "string", "valueString": "1234-56"},
                    "BeginningBalance": {"type": "number", "valueNumber": 100.0},
                    "EndingBalance": {"type": "number", "valueNumber": 120.0},
                    "Transactions": {"type": "array", "valueArray": [
                        {"type": "object", "valueObject": {
                            "Date": {"type": "date", "valueDate": "2025-07-02"},
                            "Description": {"type": "string", "valueString": "DEPOSIT"},
                            "DepositAmount": {"type": "number", "valueNumber": 50.0}
                        }},
                        {"type": "object", "valueObject": {
                            "Date": {"type": "date", "valueDate": "2025-07-03"},
                            "Description": {"type": "string", "valueString": "CHQ 101"},
                            "WithdrawalAmount": {
                                "type": "currency",
                                "valueCurrency": {"amount": 30.0}
                            },
                            "CheckNumber": {"type": "string", "valueString": "101"}
                        }}
                    ]}
                }
            }]}
        }))
    }

    #[test]
    fn test_statement_from_fields() {
        let st = statement_from_fields(&bank_fields());
        assert_eq!(st.metadata.account_holder, "JANE DOE");
        assert_eq!(st.metadata.statement_period.start_date, "2025-07-01");
        assert_eq!(st.metadata.statement_period.end_date, "2025-07-31");

        let acct = &st.accounts[0];
        assert_eq!(acct.account_number, "1234-56");
        assert_eq!(acct.account_type, "");
        assert_eq!(acct.ending_balance, 120.0);
        let balances: Vec<f64> = acct.transactions.iter().map(|t| t.running_balance).collect();
        assert_eq!(balances, vec![150.0, 120.0]);
        assert_eq!(acct.transactions[1].withdrawal, 30.0);
        assert_eq!(acct.transactions[1].check_number, "101");
    }

    #[test]
    fn test_empty_tree_maps_to_defaults() {
        let st = statement_from_fields(&FieldTree::default());
        assert_eq!(st, Statement::default());
    }

    #[test]
    fn test_receipt_from_fields() {
        let doc = AnalyzedDocument {
            doc_type: "receipt.retailMeal".to_string(),
            fields: FieldTree::new(json!({
                "MerchantName": {"valueString": "Contoso"},
                "TransactionDate": {"valueDate": "2019-06-10"},
                "Total": {"valueCurrency": {"amount": 14.5, "currencyCode": "USD"}},
                "TotalTax": {"valueCurrency": {"amount": 1.25}},
                "Items": {"valueArray": [{"valueObject": {
                    "Description": {"valueString": "Surface Pro 6"},
                    "Quantity": {"valueNumber": 1},
                    "TotalPrice": {"valueCurrency": {"amount": 999.0}}
                }}]}
            })),
        };
        let r = receipt_from_fields(0, &doc);
        assert_eq!(r.receipt_number, 1);
        assert_eq!(r.merchant_name, "Contoso");
        assert_eq!(r.total, 14.5);
        assert_eq!(r.tax, 1.25);
        assert_eq!(r.tip, 0.0);
        assert_eq!(r.items[0].quantity, 1.0);
        assert_eq!(r.items[0].total_price, 999.0);
    }

    #[test]
    fn test_invoice_uses_content() {
        let fields = FieldTree::new(json!({
            "VendorName": {"valueString": "CONTOSO", "content": "CONTOSO LTD."},
            "InvoiceTotal": {"valueCurrency": {"amount": 610.0}, "content": "$610.00"},
            "Items": {"valueArray": [{"valueObject": {"Amount": {"content": "$100.00"}}}]}
        }));
        let inv = invoice_from_fields(1, &fields);
        assert_eq!(inv.invoice_number, 2);
        assert_eq!(inv.vendor_name, "CONTOSO LTD.");
        assert_eq!(inv.invoice_total, "$610.00");
        assert_eq!(inv.items[0].amount, "$100.00");
        assert_eq!(inv.items[0].description, "");
    }

    #[test]
    fn test_documents_from_analyze_result() {
        let result = json!({"documents": [
            {"docType": "bankStatement.us", "fields": {"BankName": {"valueString": "X"}}},
            {"docType": "bankStatement.us"}
        ]});
        let docs = AnalyzedDocuments::from_analyze_result(&result);
        assert_eq!(docs.documents.len(), 2);
        assert_eq!(docs.documents[0].fields.text("BankName").as_deref(), Some("X"));
        assert_eq!(docs.documents[1].fields, FieldTree::default());
        assert_eq!(docs.raw, result);
    }
}
