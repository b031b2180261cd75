/*!

This is the long-form manual for `survey_structure` and `surveyx`.

## Input conventions

Two conventions are found in the survey spreadsheets. The convention is detected
sheet by sheet.

### Tagged sheets

Every row describes one entry of the survey, with its type and a link to its parent:

| entryId | entryLabel        | entryName | entryParentIndex | entryIndex |
|---------|-------------------|-----------|------------------|------------|
| 1       | Bilan 2023        | Survey    | -1               | 0          |
| 2       | Informations      | Section   | 0                | 1          |
| 3       | Adresse du bureau | Question  | 1                | 2          |
| 4       | Oui               | Response  | 2                | 3          |
| 5       | Non               | Response  | 2                | 4          |

The header row is optional. Without it, the label, type, parent index and
entry index are read from the 2nd to 5th columns. With it, the columns may be
in any order, and extra columns named like `Description`, `Note`, `Caution`
or `Condition` provide authored notes that take precedence over the derived ones.

The recognized types are `Survey`, `Context`, `Section`, `Subsection`,
`Question` and `Response` (case does not matter). Other rows are ignored.
The tree is built in row order:
- a `Survey` row sets the title (the last one wins)
- a `Section` row opens a new section
- a `Subsection` row opens a subsection in the open section. It is dropped when
  no section is open.
- a `Question` row goes to the open subsection, or else to the open section
- a `Response` row becomes an option of the open question. A question with
  two options or more is a `single_choice` question.
- a `Context` row before any section opens a section titled `Context: <label>`

A sheet is considered tagged when its first 20 rows mention at least 3 of the
markers `Survey`, `Context`, `Section`, `Question`, `Response`, and it has at
least 3 rows and 5 columns.

### Untagged sheets

Any other sheet is scanned cell by cell. A cell longer than 10 characters
that reads like a question (`?`, `quel`, `comment`, `combien`, `avez-vous`, ...)
becomes a question of a section named after the sheet. Untagged sheets are
only used when no sheet of the workbook is tagged.

## Derived metadata

Every node carries a metadata record:
- `entryFullPath`: the titles from the section down to the node, joined by `/`.
  Long titles are shortened to 60 characters at a sentence or word boundary.
- `entryDescription`, `entryAnnotation`, `caution`: derived from keywords of the text
- `existingConditions`: never empty
- `coordinates`: an ISO 6709 capture schema for geographic fields (`adresse`,
  `région`, `commune`, ...), `{}` otherwise. Its `example` is
  `+12.6392-008.0029/`: the longitude is written with three digits so that
  the example matches the `validation_pattern` given next to it.
- `table_reference` (questions): the external table referenced by the text,
  like `TableRef:08`

## Configuration

`surveyx` runs with sensible defaults. A configuration file in JSON may be given
with `--config`:

```text
{
  "outputSettings": { "outputPath": "out.json", "schemaName": "survey_diagnostic" },
  "fileSources": [
    { "filePath": "MODELISATION_DIAGNOSTIC.xlsx", "provider": "excel", "excelWorksheetName": "Feuil1" }
  ],
  "parserSettings": { "detectionRowWindow": 20, "minimumMarkerTypes": "3" }
}
```

Paths are relative to the configuration file. Numbers may be given as strings.

The `provider` is `excel` (xlsx, xlsm, xlsb, xls, ods) or `csv`. When missing,
it is guessed from the file extension.

The schema name is one of `survey_balance`, `survey_diagnostic` and `survey_program`.
When missing, it is guessed from the file name (`bilan`, `diagnostic`, `programme`).

 */
