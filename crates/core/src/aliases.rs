//! Historical field names used by upstream producers.
//!
//! Each canonical field maps to an ordered alias list; the first alias
//! present on a record wins. Lookup is case-insensitive, so only one casing
//! of each name is listed.

// ---------------------------------------------------------------------------
// KPI field tables
// ---------------------------------------------------------------------------

/// Alias lists for every canonical KPI input of one scope.
#[derive(Debug, Clone, Copy)]
pub struct KpiFieldTable {
    pub oee: &'static [&'static str],
    pub availability: &'static [&'static str],
    /// Performance already expressed as percent of nominal speed.
    pub performance_percent: &'static [&'static str],
    /// Performance whose unit depends on the producer (see `SourceProfile`).
    pub performance_raw: &'static [&'static str],
    /// Performance already expressed in units per hour.
    pub performance_uph: &'static [&'static str],
    pub quality: &'static [&'static str],
    pub ok_count: &'static [&'static str],
    pub nok_count: &'static [&'static str],
    pub nominal_uph: &'static [&'static str],
    pub seconds_per_piece: &'static [&'static str],
}

/// Shift-scoped KPI fields.
pub const SHIFT_KPI_FIELDS: KpiFieldTable = KpiFieldTable {
    oee: &["oee_turno", "oeeTurno", "shift_oee", "oee"],
    availability: &[
        "disponibilita_turno",
        "disponibilitaTurno",
        "shift_availability",
        "disponibilita",
        "availability",
    ],
    performance_percent: &[
        "performance_pct",
        "performancePercent",
        "performance_percent",
        "efficienza_turno",
        "efficienza",
    ],
    performance_raw: &["prestazioni_turno", "performanceTurno", "shift_performance", "performance"],
    performance_uph: &[
        "velocita_turno",
        "velocitaTurno",
        "pezzi_ora_turno",
        "shift_uph",
        "uph",
        "pezzi_ora",
    ],
    quality: &["qualita_turno", "qualitaTurno", "shift_quality", "qualita", "quality"],
    ok_count: &["pezzi_buoni_turno", "okTurno", "shift_ok", "pezzi_buoni", "qta_ok", "ok", "good"],
    nok_count: &[
        "pezzi_scarto_turno",
        "nokTurno",
        "shift_nok",
        "pezzi_scarto",
        "scarti",
        "qta_nok",
        "nok",
        "scrap",
    ],
    nominal_uph: NOMINAL_UPH,
    seconds_per_piece: &["secondi_pezzo_turno", "secondi_pezzo", "seconds_per_piece", "cycle_time"],
};

/// Work-order-scoped KPI fields.
pub const WORK_ORDER_KPI_FIELDS: KpiFieldTable = KpiFieldTable {
    oee: &["oee_commessa", "oeeCommessa", "oee_odl", "work_order_oee", "wo_oee"],
    availability: &[
        "disponibilita_commessa",
        "disponibilitaCommessa",
        "work_order_availability",
        "wo_availability",
    ],
    performance_percent: &[
        "performance_commessa_pct",
        "work_order_performance_pct",
        "wo_performance_pct",
    ],
    performance_raw: &[
        "prestazioni_commessa",
        "performanceCommessa",
        "work_order_performance",
        "wo_performance",
    ],
    performance_uph: &[
        "velocita_commessa",
        "velocitaCommessa",
        "pezzi_ora_commessa",
        "work_order_uph",
        "wo_uph",
    ],
    quality: &["qualita_commessa", "qualitaCommessa", "work_order_quality", "wo_quality"],
    ok_count: WORK_ORDER_OK,
    nok_count: WORK_ORDER_NOK,
    nominal_uph: NOMINAL_UPH,
    seconds_per_piece: &["secondi_pezzo_commessa", "work_order_seconds_per_piece"],
};

// ---------------------------------------------------------------------------
// Speeds
// ---------------------------------------------------------------------------

pub const NOMINAL_UPH: &[&str] = &[
    "velocita_nominale",
    "velocitaNominale",
    "nominal_speed",
    "nominal_uph",
    "nominalUph",
    "vel_nom",
];

pub const TARGET85_UPH: &[
    &str] = &["velocita_target_85",
    "target85",
    "target_85_uph",
    "target85Uph",
    "target_uph",
];

// ---------------------------------------------------------------------------
// Production counts
// ---------------------------------------------------------------------------

// Shift ok/nok counts are read through `SHIFT_KPI_FIELDS`.
pub const SHIFT_REWORK: &[&str] = &["pezzi_rilavorati_turno", "reworkTurno", "shift_rework"];

pub const WORK_ORDER_OK: &[&str] = &[
    "pezzi_buoni_commessa",
    "okCommessa",
    "work_order_ok",
    "qta_prodotta",
    "produced_ok",
];
pub const WORK_ORDER_NOK: &[
    &str] = &["pezzi_scarto_commessa",
    "nokCommessa",
    "work_order_nok",
    "qta_scarto",
];
pub const WORK_ORDER_REWORK: &[
    &str] = &["pezzi_rilavorati_commessa",
    "reworkCommessa",
    "work_order_rework",
    "qta_rilavorata",
];
pub const PLANNED_QUANTITY: &[
    &str] = &["qta_pianificata",
    "qtaPianificata",
    "planned_qty",
    "planned",
    "quantita_ordine",
];

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

pub const MACHINE_CODE: &[
    &str] = &["codice_macchina",
    "codiceMacchina",
    "machine_code",
    "machine_id",
    "machineId",
];
pub const MACHINE_NAME: &[
    &str] = &["descrizione_macchina",
    "nome_macchina",
    "machine_name",
    "machineName",
];
pub const STATUS_CODE: &[&str] = &["stato", "codice_stato", "status_code", "statusCode", "status"];
pub const STATUS_LABEL: &[
    &str] = &["descrizione_stato",
    "status_label",
    "statusLabel",
    "status_description",
];
pub const OPERATOR_NAME: &[
    &str] = &["operatore",
    "nome_operatore",
    "operator_name",
    "operatorName",
    "operator",
];
pub const SHIFT_CODE: &[&str] = &["codice_turno", "turno_codice", "shift_code", "shiftCode"];
pub const WORK_ORDER_CODE: &[&str] = &[
    "codice_commessa",
    "commessa",
    "codiceCommessa",
    "odl",
    "work_order_code",
    "workOrderCode",
    "work_order",
];
pub const PRODUCT_CODE: &[
    &str] = &["codice_articolo",
    "articolo",
    "codiceArticolo",
    "product_code",
    "productCode",
];
pub const PRODUCT_DESCRIPTION: &[&str] = &[
    "descrizione_articolo",
    "descrizioneArticolo",
    "product_description",
    "productDescription",
];

// ---------------------------------------------------------------------------
// Scheduling dates
// ---------------------------------------------------------------------------

pub const ESTIMATED_END: &[
    &str] = &["data_fine_stimata",
    "dataFineStimata",
    "estimated_end",
    "estimatedEndDate",
];
pub const PLANNED_END: &[
    &str] = &["data_fine_prevista",
    "dataFinePrevista",
    "planned_end",
    "plannedEndDate",
];
pub const ACTUAL_START: &[
    &str] = &["data_inizio_reale",
    "dataInizioReale",
    "actual_start",
    "actualStartDate",
];
pub const ACTUAL_END: &[
    &str] = &["data_fine_reale",
    "dataFineReale",
    "actual_end",
    "actualEndDate",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tables() -> Vec<&'static [&'static str]> {
        let mut tables = Vec::new();
        for kpi in [SHIFT_KPI_FIELDS, WORK_ORDER_KPI_FIELDS] {
            tables.extend([
                kpi.oee,
                kpi.availability,
                kpi.performance_percent,
                kpi.performance_raw,
                kpi.performance_uph,
                kpi.quality,
                kpi.ok_count,
                kpi.nok_count,
                kpi.nominal_uph,
                kpi.seconds_per_piece,
            ]);
        }
        tables.extend([
            TARGET85_UPH,
            SHIFT_REWORK,
            WORK_ORDER_OK,
            WORK_ORDER_NOK,
            WORK_ORDER_REWORK,
            PLANNED_QUANTITY,
            MACHINE_CODE,
            MACHINE_NAME,
            STATUS_CODE,
            STATUS_LABEL,
            OPERATOR_NAME,
            SHIFT_CODE,
            WORK_ORDER_CODE,
            PRODUCT_CODE,
            PRODUCT_DESCRIPTION,
            ESTIMATED_END,
            PLANNED_END,
            ACTUAL_START,
            ACTUAL_END,
        ]);
        tables
    }

    #[test]
    fn no_alias_list_is_empty() {
        assert!(all_tables().iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn no_alias_repeats_within_a_list() {
        for table in all_tables() {
            for (i, a) in table.iter().enumerate() {
                assert!(
                    !table[i + 1..].iter().any(|b| a.eq_ignore_ascii_case(b)),
                    "duplicate alias {a}"
                );
            }
        }
    }

    #[test]
    fn shift_and_work_order_kpis_do_not_share_component_aliases() {
        let shift = SHIFT_KPI_FIELDS;
        let wo = WORK_ORDER_KPI_FIELDS;
        for (a, b) in [
            (shift.oee, wo.oee),
            (shift.availability, wo.availability),
            (shift.quality, wo.quality),
            (shift.performance_uph, wo.performance_uph),
        ] {
            assert!(!a.iter().any(|x| b.iter().any(|y| x.eq_ignore_ascii_case(y))));
        }
    }
}
