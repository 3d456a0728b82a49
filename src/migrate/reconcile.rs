/// Reorders a newest-first collected sequence into oldest-first insertion
/// order.
///
/// The destination records its own "added" timestamp at write time, so the
/// only way to preserve the source chronology is to insert in the same
/// relative order as the originals, oldest first. Listings are collected in
/// explicit descending date order, which makes this a pure reversal: no
/// items are added, dropped or reordered relative to each other, and
/// applying it twice yields the input again.
pub fn reconcile<T>(mut items: Vec<T>) -> Vec<T> {
    items.reverse();
    items
}
