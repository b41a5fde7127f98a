//! Aritmética de días calendario
//!
//! Todo el sistema razona sobre "días" con una sola definición: rango
//! inclusivo de fechas locales de la flota. Este módulo centraliza esa
//! definición para el detector de solapamientos, el motor de conciliación
//! de pagos y los barridos periódicos.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Fin del día laboral cuando el horario no define `shift_end`
pub fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap()
}

/// Fecha calendario "hoy" en la zona horaria de la flota
pub fn local_today(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

/// Fecha calendario local correspondiente a un instante UTC
pub fn to_local_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Convertir un día + hora de pared local a instante UTC
pub fn local_datetime_to_utc(day: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    let naive_utc = day.and_time(time) - Duration::seconds(offset.local_minus_utc() as i64);
    DateTime::<Utc>::from_naive_utc_and_offset(naive_utc, Utc)
}

/// Instante UTC del fin (23:59:59.999 local) de un día calendario
pub fn end_of_day_utc(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    local_datetime_to_utc(day, end_of_day_time(), offset)
}

/// Rango inclusivo de días calendario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    /// Crear un rango; `None` si los límites están invertidos
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if end < start {
            None
        } else {
            Some(Self { start, end })
        }
    }

    /// Rango `[start, min(end ?? cap, cap)]`, el recorte que usa la
    /// materialización de pagos (`cap` = hoy)
    pub fn clamped(start: NaiveDate, end: Option<NaiveDate>, cap: NaiveDate) -> Option<Self> {
        let effective_end = match end {
            Some(e) => e.min(cap),
            None => cap,
        };
        Self::new(start, effective_end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Iterar cada día calendario del rango, en orden ascendente
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Intersección de dos ventanas de horario a granularidad de día.
/// Un fin nulo significa "abierto hacia adelante": intersecta todo
/// desde su inicio en adelante.
pub fn windows_overlap(
    a_start: NaiveDate,
    a_end: Option<NaiveDate>,
    b_start: NaiveDate,
    b_end: Option<NaiveDate>,
) -> bool {
    let a_reaches_b = match a_end {
        Some(e) => b_start <= e,
        None => true,
    };
    let b_reaches_a = match b_end {
        Some(e) => a_start <= e,
        None => true,
    };
    a_reaches_b && b_reaches_a
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(DayRange::new(d("2024-01-10"), d("2024-01-09")).is_none());
        assert!(DayRange::new(d("2024-01-10"), d("2024-01-10")).is_some());
    }

    #[test]
    fn test_clamped_caps_open_range_at_today() {
        let range = DayRange::clamped(d("2024-01-10"), None, d("2024-01-12")).unwrap();
        assert_eq!(range.end, d("2024-01-12"));
        assert_eq!(range.len_days(), 3);
    }

    #[test]
    fn test_clamped_prefers_earlier_end_date() {
        let range = DayRange::clamped(d("2024-01-10"), Some(d("2024-01-11")), d("2024-01-20")).unwrap();
        assert_eq!(range.end, d("2024-01-11"));
    }

    #[test]
    fn test_clamped_none_for_future_start() {
        // Un horario futuro todavía no tiene días materializables
        assert!(DayRange::clamped(d("2024-02-01"), None, d("2024-01-12")).is_none());
    }

    #[test]
    fn test_contains_is_inclusive_on_both_ends() {
        let range = DayRange::new(d("2024-01-10"), d("2024-01-12")).unwrap();
        assert!(range.contains(d("2024-01-10")));
        assert!(range.contains(d("2024-01-12")));
        assert!(!range.contains(d("2024-01-09")));
        assert!(!range.contains(d("2024-01-13")));
    }

    #[test]
    fn test_days_iterates_inclusive() {
        let range = DayRange::new(d("2024-01-10"), d("2024-01-12")).unwrap();
        let days: Vec<NaiveDate> = range.days().collect();
        assert_eq!(days, vec![d("2024-01-10"), d("2024-01-11"), d("2024-01-12")]);
    }

    #[test]
    fn test_windows_overlap_contained() {
        // Caso de la propiedad de rechazo de solapamientos:
        // [2024-01-10, 2024-01-20] contra [2024-01-15, 2024-01-18]
        assert!(windows_overlap(
            d("2024-01-10"),
            Some(d("2024-01-20")),
            d("2024-01-15"),
            Some(d("2024-01-18")),
        ));
    }

    #[test]
    fn test_windows_overlap_disjoint() {
        assert!(!windows_overlap(
            d("2024-01-10"),
            Some(d("2024-01-14")),
            d("2024-01-15"),
            Some(d("2024-01-18")),
        ));
    }

    #[test]
    fn test_windows_overlap_shared_boundary_day() {
        // Los rangos son inclusivos: compartir un día es conflicto
        assert!(windows_overlap(
            d("2024-01-10"),
            Some(d("2024-01-15")),
            d("2024-01-15"),
            Some(d("2024-01-18")),
        ));
    }

    #[test]
    fn test_windows_overlap_open_ended() {
        // Sin fin, la ventana intersecta todo desde su inicio en adelante
        assert!(windows_overlap(
            d("2024-01-10"),
            None,
            d("2025-06-01"),
            Some(d("2025-06-02")),
        ));
        // ...pero no lo anterior a su inicio
        assert!(!windows_overlap(
            d("2024-01-10"),
            None,
            d("2023-12-01"),
            Some(d("2023-12-31")),
        ));
    }

    #[test]
    fn test_end_of_day_respects_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let eod = end_of_day_utc(d("2024-01-10"), offset);
        // 23:59:59.999 local a UTC-5 son las 04:59:59.999 del día siguiente en UTC
        let expected = Utc
            .with_ymd_and_hms(2024, 1, 11, 4, 59, 59)
            .unwrap()
            .checked_add_signed(Duration::milliseconds(999))
            .unwrap();
        assert_eq!(eod, expected);
    }

    #[test]
    fn test_to_local_day_crosses_midnight() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 1, 11, 2, 0, 0).unwrap();
        // Las 02:00 UTC siguen siendo el día 10 a UTC-5
        assert_eq!(to_local_day(instant, offset), d("2024-01-10"));
    }
}
