//! The UBL → CII mapping table.
//!
//! Pure configuration: every rule names a target element, where its value
//! and attributes come from in the UBL source, and how its children nest.
//! The table is built once and shared by all conversions.

use std::sync::LazyLock;

use super::{RuleSet, collection, element};
use crate::{PREFIX_RAM, PREFIX_RSM, PREFIX_UDT};

static CII_RULES: LazyLock<RuleSet> = LazyLock::new(build_rules);

/// The top-level rule set emitted under `rsm:CrossIndustryInvoice`.
pub fn rules() -> &'static RuleSet {
    &CII_RULES
}

fn build_rules() -> RuleSet {
    rules![
        element("ExchangedDocumentContext")
            .prefix(PREFIX_RSM)
            .children(rules![
                element("GuidelineSpecifiedDocumentContextParameter")
                    .prefix(PREFIX_RAM)
                    .children(rules![
                        element("ID")
                            .prefix(PREFIX_RAM)
                            .source("//cbc:CustomizationID"),
                    ]),
            ]),
        element("ExchangedDocument")
            .prefix(PREFIX_RSM)
            .children(rules![
                element("ID").prefix(PREFIX_RAM).source("//cbc:ID"),
                element("TypeCode")
                    .prefix(PREFIX_RAM)
                    .source("//cbc:InvoiceTypeCode"),
                element("IssueDateTime").prefix(PREFIX_RAM).children(rules![
                    element("DateTimeString")
                        .prefix(PREFIX_UDT)
                        .source("//cbc:IssueDate")
                        .prop("format", "102"),
                ]),
                element("IncludedNote").prefix(PREFIX_RAM).children(rules![
                    element("Content").source("//cbc:Note"),
                ]),
            ]),
        element("SupplyChainTradeTransaction")
            .prefix(PREFIX_RSM)
            .children(rules![
                collection("IncludedSupplyChainTradeLineItem", "//cac:InvoiceLine")
                    .prefix(PREFIX_RAM)
                    .items(line_item_rules()),
                element("ApplicableHeaderTradeAgreement")
                    .prefix(PREFIX_RAM)
                    .children(header_trade_agreement_rules()),
                element("ApplicableHeaderTradeDelivery")
                    .prefix(PREFIX_RAM)
                    .rescope("//cac:Delivery")
                    .children(rules![
                        element("ShipToTradeParty").children(rules![
                            element("ID")
                                .source("cac:DeliveryLocation//cbc:ID")
                                .attr("schemeID"),
                            postal_trade_address("cac:DeliveryLocation//cac:Address"),
                        ]),
                        element("ActualDeliverySupplyChainEvent").children(rules![
                            element("OccurrenceDateTime").children(rules![
                                element("DateTimeString")
                                    .prefix(PREFIX_UDT)
                                    .source("cbc:ActualDeliveryDate")
                                    .prop("format", "102"),
                            ]),
                        ]),
                    ]),
                element("ApplicableHeaderTradeSettlement")
                    .prefix(PREFIX_RAM)
                    .children(header_trade_settlement_rules()),
            ]),
    ]
}

fn line_item_rules() -> RuleSet {
    rules![
        element("AssociatedDocumentLineDocument").children(rules![
            element("LineID").source("cbc:ID"),
            element("IncludedNote").prefix(PREFIX_RAM).children(rules![
                element("Content").source("cbc:Note"),
            ]),
        ]),
        element("SpecifiedTradeProduct")
            .rescope("cac:Item")
            .children(rules![
                element("GlobalID")
                    .source("cac:StandardItemIdentification//cbc:ID")
                    .attr("schemeID"),
                element("SellerAssignedID").source("cac:SellersItemIdentification//cbc:ID"),
                element("Name").source("cbc:Name"),
                element("Description").source("cbc:Description"),
                collection(
                    "ApplicableProductCharacteristic",
                    "cac:AdditionalItemProperty"
                )
                .prefix(PREFIX_RAM)
                .items(rules![
                    element("Description").source("cbc:Name"),
                    element("Value").source("cbc:Value"),
                ]),
                collection(
                    "DesignatedProductClassification",
                    "cac:CommodityClassification"
                )
                .prefix(PREFIX_RAM)
                .items(rules![
                    element("ClassCode")
                        .source("cbc:ItemClassificationCode")
                        .attr("listID"),
                ]),
            ]),
        element("SpecifiedLineTradeAgreement").children(rules![
            element("BuyerOrderReferencedDocument").children(rules![
                element("LineID").source("cac:OrderLineReference//cbc:LineID"),
            ]),
            element("NetPriceProductTradePrice").children(rules![
                element("ChargeAmount")
                    .source("cac:Price//cbc:PriceAmount")
                    .attr("currencyID"),
            ]),
        ]),
        element("SpecifiedLineTradeDelivery").children(rules![
            element("BilledQuantity")
                .source("cbc:InvoicedQuantity")
                .attr("unitCode"),
        ]),
        element("SpecifiedLineTradeSettlement").children(rules![
            element("ApplicableTradeTax")
                .rescope("cac:Item//cac:ClassifiedTaxCategory")
                .children(rules![
                    element("TypeCode").source("cac:TaxScheme//cbc:ID"),
                    element("CategoryCode").source("cbc:ID"),
                    element("RateApplicablePercent").source("cbc:Percent"),
                ]),
            element("SpecifiedTradeSettlementLineMonetarySummation").children(rules![
                element("LineTotalAmount")
                    .source("cbc:LineExtensionAmount")
                    .attr("currencyID"),
            ]),
            element("ReceivableSpecifiedTradeAccountingAccount").children(rules![
                element("ID").source("cbc:AccountingCost"),
            ]),
        ]),
    ]
}

fn header_trade_agreement_rules() -> RuleSet {
    rules![
        element("SellerTradeParty")
            .rescope("//cac:AccountingSupplierParty//cac:Party")
            .children(trade_party_rules()),
        element("BuyerTradeParty")
            .rescope("//cac:AccountingCustomerParty//cac:Party")
            .children(trade_party_rules()),
        element("BuyerOrderReferencedDocument").children(rules![
            element("IssuerAssignedID").source("//cac:OrderReference//cbc:ID"),
        ]),
        element("ContractReferencedDocument").children(rules![
            element("IssuerAssignedID").source("//cac:ContractDocumentReference//cbc:ID"),
        ]),
        collection(
            "AdditionalReferencedDocument",
            "//cac:AdditionalDocumentReference"
        )
        .items(rules![
            element("IssuerAssignedID").source("cbc:ID"),
            element("URIID").source("cac:Attachment//cac:ExternalReference//cbc:URI"),
            element("TypeCode").source("cbc:DocumentTypeCode"),
            element("Name").source("cbc:DocumentDescription"),
            element("AttachmentBinaryObject").source("cac:Attachment//cbc:EmbeddedDocumentBinaryObject"),
        ]),
    ]
}

/// Shared shape of seller and buyer parties.
fn trade_party_rules() -> RuleSet {
    rules![
        element("ID")
            .source("cac:PartyIdentification//cbc:ID")
            .attr("schemeID"),
        element("Name").source("cac:PartyName//cbc:Name"),
        element("SpecifiedLegalOrganization")
            .rescope("cac:PartyLegalEntity")
            .children(rules![
                element("ID").source("cbc:CompanyID").attr("schemeID"),
                element("TradingBusinessName").source("cbc:RegistrationName"),
                element("PostalTradeAddress")
                    .rescope("cac:RegistrationAddress")
                    .children(rules![
                        element("CityName").source("cbc:CityName"),
                        element("CountryID").source("cac:Country//cbc:IdentificationCode"),
                        element("CountrySubDivisionName").source("cbc:CountrySubentity"),
                    ]),
            ]),
        postal_trade_address("cac:PostalAddress"),
        element("URIUniversalCommunication").children(rules![
            element("URIID").source("cbc:EndpointID").attr("schemeID"),
        ]),
        element("SpecifiedTaxRegistration")
            .rescope("cac:PartyTaxScheme")
            .children(rules![
                element("ID")
                    .source("cbc:CompanyID")
                    .prop_path("schemeID", "cac:TaxScheme//cbc:ID"),
            ]),
    ]
}

/// `PostalTradeAddress` re-scoped to the given UBL address node.
fn postal_trade_address(source: &str) -> super::FieldRule {
    element("PostalTradeAddress").rescope(source).children(rules![
        element("PostcodeCode").source("cbc:PostalZone"),
        element("LineOne").source("cbc:StreetName"),
        element("LineTwo").source("cbc:AdditionalStreetName"),
        element("CityName").source("cbc:CityName"),
        element("CountryID").source("cac:Country//cbc:IdentificationCode"),
        element("CountrySubDivisionName").source("cbc:CountrySubentity"),
    ])
}

fn header_trade_settlement_rules() -> RuleSet {
    rules![
        element("PaymentReference").source("//cac:PaymentMeans//cbc:PaymentID"),
        element("InvoiceCurrencyCode").source("//cbc:DocumentCurrencyCode"),
        element("PayeeTradeParty")
            .rescope("//cac:PayeeParty")
            .children(rules![
                element("ID")
                    .source("cac:PartyIdentification//cbc:ID")
                    .attr("schemeID"),
                element("Name").source("cac:PartyName//cbc:Name"),
                element("SpecifiedLegalOrganization")
                    .rescope("cac:PartyLegalEntity")
                    .children(rules![
                        element("ID").source("cbc:CompanyID").attr("schemeID"),
                    ]),
            ]),
        collection("SpecifiedTradeSettlementPaymentMeans", "//cac:PaymentMeans").items(rules![
            element("TypeCode").source("cbc:PaymentMeansCode"),
            element("PayeePartyCreditorFinancialAccount")
                .rescope("cac:PayeeFinancialAccount")
                .children(rules![
                    element("IBANID").source("cbc:ID"),
                    element("AccountName").source("cbc:Name"),
                ]),
        ]),
        element("ApplicableTradeTax")
            .rescope("//cac:TaxTotal//cac:TaxSubtotal")
            .children(rules![
                element("CalculatedAmount")
                    .source("cbc:TaxAmount")
                    .attr("currencyID"),
                element("TypeCode").source("cac:TaxCategory//cbc:ID"),
                element("BasisAmount")
                    .source("cbc:TaxableAmount")
                    .attr("currencyID"),
                element("RateApplicablePercent").source("cac:TaxCategory//cbc:Percent"),
            ]),
        element("BillingSpecifiedPeriod")
            .rescope("//cac:InvoicePeriod")
            .children(rules![
                element("StartDateTime").children(rules![
                    element("DateTimeString")
                        .prefix(PREFIX_UDT)
                        .source("cbc:StartDate")
                        .prop("format", "102"),
                ]),
                element("EndDateTime").children(rules![
                    element("DateTimeString")
                        .prefix(PREFIX_UDT)
                        .source("cbc:EndDate")
                        .prop("format", "102"),
                ]),
            ]),
        collection("SpecifiedTradeAllowanceCharge", "//cac:AllowanceCharge").items(rules![
            element("ChargeIndicator").children(rules![
                element("Indicator")
                    .prefix(PREFIX_UDT)
                    .source("cbc:ChargeIndicator"),
            ]),
            element("ActualAmount").source("cbc:Amount"),
            element("Reason").source("cbc:AllowanceChargeReason"),
        ]),
        element("SpecifiedTradePaymentTerms").children(rules![
            element("Description").source("//cac:PaymentTerms//cbc:Note"),
            element("DueDateDateTime")
                .rescope("//cac:PaymentMeans")
                .children(rules![
                    element("DateTimeString")
                        .prefix(PREFIX_UDT)
                        .source("cbc:PaymentDueDate")
                        .prop("format", "102"),
                ]),
        ]),
        element("SpecifiedTradeSettlementHeaderMonetarySummation").children(rules![
            element("LineTotalAmount")
                .source("//cac:LegalMonetaryTotal//cbc:LineExtensionAmount")
                .attr("currencyID"),
            element("ChargeTotalAmount")
                .source("//cac:LegalMonetaryTotal//cbc:ChargeTotalAmount")
                .attr("currencyID"),
            element("AllowanceTotalAmount")
                .source("//cac:LegalMonetaryTotal//cbc:AllowanceTotalAmount")
                .attr("currencyID"),
            element("TaxBasisTotalAmount")
                .source("//cac:LegalMonetaryTotal//cbc:TaxExclusiveAmount")
                .attr("currencyID"),
            element("TaxTotalAmount")
                .source("//cac:TaxTotal//cbc:TaxAmount")
                .attr("currencyID"),
            element("RoundingAmount")
                .source("//cac:LegalMonetaryTotal//cbc:PayableRoundingAmount")
                .attr("currencyID"),
            element("GrandTotalAmount")
                .source("//cac:LegalMonetaryTotal//cbc:TaxInclusiveAmount")
                .attr("currencyID"),
            element("TotalPrepaidAmount")
                .source("//cac:LegalMonetaryTotal//cbc:PrepaidAmount")
                .attr("currencyID"),
            element("DuePayableAmount")
                .source("//cac:LegalMonetaryTotal//cbc:PayableAmount")
                .attr("currencyID"),
        ]),
        element("ReceivableSpecifiedTradeAccountingAccount").children(rules![
            element("ID").source("//cbc:AccountingCost"),
        ]),
    ]
}
