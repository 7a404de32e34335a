/*!

This is the long-form manual for `feature_poll` and `featpoll`.

## The feature poll

Respondents compare five feature concepts two at a time. Each comparison is a survey
column whose answer is `1` when the first-named concept is preferred, and anything else
when the second one is preferred:

| column | `1` credits | otherwise credits |
|--------|-------------|-------------------|
| `Q14`  | AC          | RR                |
| `Q15`  | AC          | CR                |
| `Q16`  | AC          | SGT               |
| `Q17`  | AC          | JA                |
| `Q18`  | RR          | CR                |
| `Q19`  | RR          | SGT               |
| `Q20`  | RR          | JA                |
| `Q21`  | CR          | SGT               |
| `Q22`  | CR          | JA                |
| `Q23`  | SGT         | JA                |

The feature score of a respondent is the number of comparisons won by each concept.
Every concept appears in four comparisons, so a score is between 0 and 4, and the five
scores of a respondent always add up to 10. A respondent that skipped any comparison
is not scored.

## Grouped scores

The scores can be summed per category of a grouping question:

- `Pay Question` (`Q24`): seven price bands, from "Would not pay" (code 1) to "£10.00+" (code 7).
- `Buy Question` (`Q25`): four buying sentiment categories (codes 1 to 4).

Every category is reported, in ascending code order, even when nobody picked it (its scores
are then all zero). Respondents whose code is missing or unknown are counted as unassigned.

In percentage mode, each category is expressed as a share of its own total. The share of
an empty category is undefined: it is left out of the charts.

## Input files

`featpoll` reads survey exports with 39 columns in a fixed order: ten metadata columns
(`Respondent ID`, `Collector ID`, `Start Date`, `End Date`, `IP Address`, `Email Address`,
`First Name`, `Last Name`, `Custom Data 1`, `collector_type_source`), 26 questions,
then `Age`, `Device Type` and `Gender`. The first line is the header and the second line
repeats the answer labels; it is always discarded.

Supported providers:
* `csv` Comma Separated Values (default)
* `xlsx` Excel workbook (first worksheet, unless `excelWorksheetName` is given)

## Configuration

A study is described in JSON:

```text
{
  "outputSettings": {
    "studyName": "Feature poll",
    "outputDirectory": "charts",
    "summaryFile": "summary.json"
  },
  "surveySources": [
    {
      "label": "BHM",
      "filePath": "file_1.csv",
      "title": "(BHM survey)",
      "charts": [
        { "grouping": "total" },
        { "grouping": "price", "percentage": true },
        { "grouping": "buy" }
      ]
    }
  ]
}
```

File paths are relative to the configuration file. Without `outputDirectory`, no chart is
written. Without `summaryFile`, the summary is printed on the standard output.

*/
